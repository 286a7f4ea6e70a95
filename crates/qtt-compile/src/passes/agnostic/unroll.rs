//! Unrolling of three-qubit gates.

use qtt_ir::{CircuitDag, Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Decompose a three-qubit standard gate into one- and two-qubit gates.
///
/// Returns `None` for any other gate.
pub(crate) fn unroll(
    gate: StandardGate,
    qubits: &[QubitId],
) -> Option<Vec<(StandardGate, Vec<QubitId>)>> {
    use StandardGate as G;

    match gate {
        G::CCX => {
            let (a, b, c) = (qubits[0], qubits[1], qubits[2]);
            Some(vec![
                (G::H, vec![c]),
                (G::CX, vec![b, c]),
                (G::Tdg, vec![c]),
                (G::CX, vec![a, c]),
                (G::T, vec![c]),
                (G::CX, vec![b, c]),
                (G::Tdg, vec![c]),
                (G::CX, vec![a, c]),
                (G::T, vec![b]),
                (G::T, vec![c]),
                (G::H, vec![c]),
                (G::CX, vec![a, b]),
                (G::T, vec![a]),
                (G::Tdg, vec![b]),
                (G::CX, vec![a, b]),
            ])
        }
        G::CSwap => {
            let (a, b, c) = (qubits[0], qubits[1], qubits[2]);
            let mut steps = vec![(G::CX, vec![c, b])];
            steps.extend(unroll(G::CCX, &[a, b, c])?);
            steps.push((G::CX, vec![c, b]));
            Some(steps)
        }
        _ => None,
    }
}

/// Rewrites Toffoli and Fredkin gates the target cannot run natively, so
/// that routing only sees one- and two-qubit gates.
///
/// Without basis gates in the `PropertySet` every three-qubit gate is
/// unrolled. Custom gates on three or more qubits are rejected.
pub struct UnrollMultiQubit;

impl Pass for UnrollMultiQubit {
    fn name(&self) -> &'static str {
        "UnrollMultiQubit"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let native = |name: &str| {
            properties
                .basis_gates
                .as_ref()
                .is_some_and(|b| b.contains(name))
        };

        let mut new_dag = dag.copy_empty_like();
        for (_, inst) in dag.topological_ops() {
            let Some(gate) = inst.as_gate() else {
                new_dag.apply(inst.clone())?;
                continue;
            };
            if inst.qubits.len() < 3 || native(gate.name()) {
                new_dag.apply(inst.clone())?;
                continue;
            }

            let steps = gate
                .as_standard()
                .and_then(|g| unroll(*g, &inst.qubits))
                .ok_or_else(|| CompileError::GateNotInBasis(gate.name().to_string()))?;
            for (g, qubits) in steps {
                new_dag.apply(Instruction::gate(g, qubits))?;
            }
        }

        *dag = new_dag;
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, _properties: &PropertySet) -> bool {
        dag.topological_ops()
            .any(|(_, inst)| inst.is_gate() && inst.qubits.len() >= 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::BasisGates;
    use qtt_ir::Circuit;

    #[test]
    fn test_ccx_unrolled() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();
        props.basis_gates = Some(BasisGates::ibm());

        assert!(UnrollMultiQubit.should_run(&dag, &props));
        UnrollMultiQubit.run(&mut dag, &mut props).unwrap();

        let cx = dag
            .topological_ops()
            .filter(|(_, i)| i.name() == "cx")
            .count();
        assert_eq!(cx, 6);
        assert_eq!(dag.num_ops(), 15);
        assert!(!UnrollMultiQubit.should_run(&dag, &props));
    }

    #[test]
    fn test_cswap_unrolled() {
        let steps = unroll(StandardGate::CSwap, &[QubitId(0), QubitId(1), QubitId(2)]).unwrap();
        assert_eq!(steps.len(), 17);
        assert_eq!(steps[0], (StandardGate::CX, vec![QubitId(2), QubitId(1)]));
    }

    #[test]
    fn test_native_ccx_kept() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();
        props.basis_gates = Some(BasisGates::universal());

        UnrollMultiQubit.run(&mut dag, &mut props).unwrap();
        assert_eq!(dag.num_ops(), 1);
    }
}
