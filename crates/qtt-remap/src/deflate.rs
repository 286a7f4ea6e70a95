//! Removing idle qubits from a circuit.

use rustc_hash::FxHashMap;
use tracing::debug;

use qtt_ir::{Circuit, CircuitDag, Instruction, QubitId};

use crate::error::RemapResult;

/// Qubits touched by at least one operation other than a barrier or delay,
/// ascending.
pub fn active_qubits(circuit: &Circuit) -> Vec<QubitId> {
    let mut active: Vec<QubitId> = circuit
        .instructions()
        .filter(|inst| !inst.is_barrier() && !inst.is_delay())
        .flat_map(|inst| inst.qubits.iter().copied())
        .collect();
    active.sort_unstable();
    active.dedup();
    active
}

/// Drop every idle qubit and relabel the active ones densely.
///
/// Active qubit `k` (in ascending order) becomes qubit `k` of the result.
/// Barriers are narrowed to the active qubits they cover, delays on idle
/// qubits disappear, and classical bits and the global phase are kept.
///
/// ```rust
/// use qtt_ir::{Circuit, QubitId};
/// use qtt_remap::deflate_circuit;
///
/// let mut circuit = Circuit::with_size("sparse", 5, 0);
/// circuit.cx(QubitId(1), QubitId(4)).unwrap();
///
/// let small = deflate_circuit(&circuit).unwrap();
/// assert_eq!(small.num_qubits(), 2);
/// let cx = small.instructions().next().unwrap();
/// assert_eq!(cx.qubits, vec![QubitId(0), QubitId(1)]);
/// ```
pub fn deflate_circuit(circuit: &Circuit) -> RemapResult<Circuit> {
    let active = active_qubits(circuit);
    let relabel: FxHashMap<QubitId, QubitId> = active
        .iter()
        .enumerate()
        .map(|(i, &q)| (q, QubitId(i as u32)))
        .collect();

    let mut dag = CircuitDag::new();
    for i in 0..active.len() {
        dag.add_qubit(QubitId(i as u32));
    }
    for clbit in circuit.dag().clbits() {
        dag.add_clbit(clbit);
    }
    dag.set_global_phase(circuit.dag().global_phase());

    for inst in circuit.instructions() {
        let Some(inst) = narrow(inst, &relabel) else {
            continue;
        };
        dag.apply(inst)?;
    }

    debug!(
        "Deflated '{}' from {} to {} qubits",
        circuit.name(),
        circuit.num_qubits(),
        active.len()
    );

    Ok(Circuit::from_dag(dag).with_name(circuit.name()))
}

/// Relabel an instruction onto the active qubits, or drop it.
fn narrow(inst: &Instruction, relabel: &FxHashMap<QubitId, QubitId>) -> Option<Instruction> {
    if inst.is_barrier() {
        let qubits: Vec<QubitId> = inst
            .qubits
            .iter()
            .filter_map(|q| relabel.get(q).copied())
            .collect();
        return (!qubits.is_empty()).then(|| Instruction::barrier(qubits));
    }

    let qubits = inst
        .qubits
        .iter()
        .map(|q| relabel.get(q).copied())
        .collect::<Option<Vec<_>>>()?;
    Some(Instruction {
        kind: inst.kind.clone(),
        qubits,
        clbits: inst.clbits.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtt_ir::ClbitId;

    fn sparse() -> Circuit {
        let mut circuit = Circuit::with_size("sparse", 6, 2);
        circuit.delay(QubitId(0), 320).unwrap();
        circuit.sx(QubitId(2)).unwrap();
        circuit.cx(QubitId(2), QubitId(5)).unwrap();
        circuit.barrier_all().unwrap();
        circuit.measure(QubitId(2), ClbitId(0)).unwrap();
        circuit.measure(QubitId(5), ClbitId(1)).unwrap();
        circuit
    }

    #[test]
    fn test_active_qubits() {
        assert_eq!(active_qubits(&sparse()), vec![QubitId(2), QubitId(5)]);
    }

    #[test]
    fn test_deflate_keeps_active_qubits() {
        let small = deflate_circuit(&sparse()).unwrap();
        assert_eq!(small.name(), "sparse");
        assert_eq!(small.num_qubits(), 2);
        assert_eq!(small.num_clbits(), 2);

        let ops: Vec<_> = small.instructions().cloned().collect();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0].name(), "sx");
        assert_eq!(ops[1].qubits, vec![QubitId(0), QubitId(1)]);
        assert!(ops[2].is_barrier());
        assert_eq!(ops[2].qubits, vec![QubitId(0), QubitId(1)]);
        assert_eq!(ops[4].qubits, vec![QubitId(1)]);
        assert_eq!(ops[4].clbits, vec![ClbitId(1)]);
    }

    #[test]
    fn test_deflate_drops_idle_delays_and_barriers() {
        let mut circuit = Circuit::with_size("idle", 3, 0);
        circuit.x(QubitId(1)).unwrap();
        circuit.delay(QubitId(0), 160).unwrap();
        circuit.barrier([QubitId(0), QubitId(2)]).unwrap();

        let small = deflate_circuit(&circuit).unwrap();
        assert_eq!(small.num_qubits(), 1);
        assert_eq!(small.size(), 1);
    }

    #[test]
    fn test_deflate_keeps_phase() {
        let mut circuit = Circuit::with_size("phase", 2, 0);
        circuit.x(QubitId(1)).unwrap();
        circuit.dag_mut().set_global_phase(0.5);
        let small = deflate_circuit(&circuit).unwrap();
        assert!((small.dag().global_phase() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_deflate_dense_circuit_is_unchanged() {
        let ghz = Circuit::ghz(3).unwrap();
        let small = deflate_circuit(&ghz).unwrap();
        assert_eq!(small.num_qubits(), 3);
        assert_eq!(small.count_ops(), ghz.count_ops());
        assert_eq!(small.depth(), ghz.depth());
    }
}
