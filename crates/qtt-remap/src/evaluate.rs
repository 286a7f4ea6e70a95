//! Scoring layouts against backend calibration data.

use std::cmp::Ordering;

use tracing::{debug, info};

use qtt_hal::{Backend, HalError};
use qtt_ir::Circuit;

use crate::error::{RemapError, RemapResult};
use crate::layouts::qubit_index;

/// Cost of running a circuit under one layout; lower is better.
///
/// Called with the circuit, a layout already checked against the circuit
/// and device, and the backend.
pub type LayoutCost = dyn Fn(&Circuit, &[u32], &dyn Backend) -> RemapResult<f64> + Send + Sync;

/// Operations that cost nothing on a superconducting device.
const VIRTUAL_OPS: [&str; 4] = ["rz", "delay", "barrier", "id"];

/// Estimated infidelity `1 - Π(1 - ε)` of `circuit` under `layout`.
///
/// Gate errors come from the backend calibration, measurements use the
/// readout error of their qubit, and virtual operations are free. An entry
/// missing from the calibration counts as error-free; a backend with no
/// calibration at all is an error.
pub fn default_cost(circuit: &Circuit, layout: &[u32], backend: &dyn Backend) -> RemapResult<f64> {
    let properties = backend
        .properties()
        .ok_or_else(|| HalError::MissingProperties(backend.name().to_string()))?;
    let index = qubit_index(circuit);

    let mut fidelity = 1.0;
    for inst in circuit.instructions() {
        if VIRTUAL_OPS.contains(&inst.name()) {
            continue;
        }
        let physical: Vec<u32> = inst.qubits.iter().map(|q| layout[index[q]]).collect();
        let error = if inst.is_measure() {
            properties.readout_error(physical[0])
        } else {
            properties.gate_error(inst.name(), &physical)
        };
        fidelity *= 1.0 - error.unwrap_or(0.0);
    }

    Ok(1.0 - fidelity)
}

/// Score every layout and return `(layout, cost)` pairs, cheapest first.
///
/// The sort is stable, so equally good layouts keep their input order. A NaN
/// cost ranks after every number. Without `cost`, [`default_cost`] is used.
pub fn evaluate_layouts(
    circuit: &Circuit,
    layouts: &[Vec<u32>],
    backend: &dyn Backend,
    cost: Option<&LayoutCost>,
) -> RemapResult<Vec<(Vec<u32>, f64)>> {
    let cost = cost.unwrap_or(&default_cost);

    let mut scores = Vec::with_capacity(layouts.len());
    for layout in layouts {
        check_layout(circuit, layout, backend)?;
        scores.push((layout.clone(), cost(circuit, layout, backend)?));
    }
    scores.sort_by(|a, b| compare_costs(a.1, b.1));

    if let Some((best, score)) = scores.first() {
        info!(
            "Best of {} layouts for '{}' on '{}': {:?} (cost {:.6})",
            scores.len(),
            circuit.name(),
            backend.name(),
            best,
            score
        );
    }
    Ok(scores)
}

/// Total order on costs with NaN last.
pub fn compare_costs(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

fn check_layout(circuit: &Circuit, layout: &[u32], backend: &dyn Backend) -> RemapResult<()> {
    let invalid = |reason: String| RemapError::InvalidLayout {
        layout: layout.to_vec(),
        reason,
    };

    if layout.len() != circuit.num_qubits() {
        return Err(invalid(format!(
            "{} entries for a {}-qubit circuit",
            layout.len(),
            circuit.num_qubits()
        )));
    }
    let n = backend.num_qubits();
    if let Some(&p) = layout.iter().find(|&&p| p >= n) {
        return Err(invalid(format!("qubit {p} outside the {n}-qubit device")));
    }
    let mut sorted = layout.to_vec();
    sorted.sort_unstable();
    if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(invalid(format!("qubit {} used twice", w[0])));
    }

    debug!("Layout {:?} is valid", layout);
    Ok(())
}
