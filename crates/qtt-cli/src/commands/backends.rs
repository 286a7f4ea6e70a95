//! Backends command implementation.

use anyhow::Result;
use console::style;

use qtt_hal::{Backend, fake};

/// Execute the backends command.
pub fn execute() -> Result<()> {
    println!("{} Built-in backends:\n", style("qtt").cyan().bold());

    for name in fake::BUILTIN_BACKENDS {
        let backend = fake::builtin(name)?;
        let config = backend.configuration();
        let calibrated = backend.properties().is_some();

        println!(
            "  {} {} {}",
            if calibrated {
                style("●").green()
            } else {
                style("○").dim()
            },
            style(name).bold(),
            if config.simulator { "(simulator)" } else { "" }
        );
        println!("    Qubits: {}", config.n_qubits);
        println!("    Gates: {}", config.basis_gates.join(", "));
        println!("    Couplings: {}", config.coupling_map.len());
        match config.pulse_alignment() {
            Ok(alignment) => println!("    Pulse alignment: {alignment} dt"),
            Err(_) => println!("    Pulse alignment: {}", style("none (no DD)").dim()),
        }
        println!();
    }

    Ok(())
}
