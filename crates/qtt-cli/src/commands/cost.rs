//! Cost command implementation.

use anyhow::Result;
use console::style;

use qtt::DepthCnotCost;

use super::common::load_circuits;

/// Execute the cost command.
pub fn execute(input: &str, weight_depth: f64, weight_cnot: f64) -> Result<()> {
    let circuits = load_circuits(input)?;
    let cost = DepthCnotCost::new(weight_depth, weight_cnot);

    println!(
        "{} Cost = {} x depth + {} x cx",
        style("qtt").cyan().bold(),
        weight_depth,
        weight_cnot
    );
    println!();
    println!("  {:<20} {:>8} {:>6} {:>12}", "circuit", "depth", "cx", "cost");
    for circuit in circuits.iter() {
        println!(
            "  {:<20} {:>8} {:>6} {:>12}",
            circuit.name(),
            circuit.depth(),
            circuit.count_ops().get("cx").copied().unwrap_or(0),
            cost.cost(circuit)
        );
    }

    Ok(())
}
