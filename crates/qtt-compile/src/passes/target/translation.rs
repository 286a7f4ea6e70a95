//! Basis translation passes.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use qtt_ir::{CircuitDag, Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{BasisGates, PropertySet};

/// Angles closer than this to zero are dropped from decompositions.
const ANGLE_EPSILON: f64 = 1e-12;

/// Rewrite depth at which translation gives up.
const MAX_DEPTH: usize = 8;

/// Basis translation pass.
///
/// Rewrites every gate that is not in the target basis into RZ + SX + X +
/// CX, equal up to global phase. Gates already in the basis are kept as
/// they are; measurements, resets, barriers and delays pass through.
pub struct BasisTranslation;

impl Pass for BasisTranslation {
    fn name(&self) -> &'static str {
        "BasisTranslation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties
            .basis_gates
            .as_ref()
            .ok_or(CompileError::MissingBasisGates)?;

        let mut new_dag = dag.copy_empty_like();
        for (_, inst) in dag.topological_ops() {
            let Some(gate) = inst.as_gate() else {
                new_dag.apply(inst.clone())?;
                continue;
            };
            if basis.contains(gate.name()) {
                new_dag.apply(inst.clone())?;
                continue;
            }
            let Some(standard) = gate.as_standard() else {
                return Err(CompileError::GateNotInBasis(gate.name().to_string()));
            };
            for (g, qubits) in translate(*standard, &inst.qubits, basis, 0)? {
                new_dag.apply(Instruction::gate(g, qubits))?;
            }
        }

        *dag = new_dag;
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.basis_gates.is_some()
    }
}

type Step = (StandardGate, Vec<QubitId>);

/// Lower `gate` until every emitted gate is in `basis`.
fn translate(
    gate: StandardGate,
    qubits: &[QubitId],
    basis: &BasisGates,
    depth: usize,
) -> CompileResult<Vec<Step>> {
    if basis.contains(gate.name()) {
        return Ok(vec![(gate, qubits.to_vec())]);
    }
    if depth >= MAX_DEPTH {
        return Err(CompileError::GateNotInBasis(gate.name().to_string()));
    }
    let Some(rule) = decompose(gate, qubits) else {
        return Err(CompileError::GateNotInBasis(gate.name().to_string()));
    };

    let mut out = vec![];
    for (g, q) in rule {
        out.extend(translate(g, &q, basis, depth + 1)?);
    }
    Ok(out)
}

/// One rewriting step towards RZ + SX + X + CX.
///
/// Returns `None` for gates that are already primitive.
fn decompose(gate: StandardGate, qubits: &[QubitId]) -> Option<Vec<Step>> {
    use StandardGate as G;

    let one = |g: StandardGate| (g, vec![qubits[0]]);

    let steps = match gate {
        G::I => vec![],
        G::Y => vec![one(G::Rz(PI)), one(G::X)],
        G::Z => vec![one(G::Rz(PI))],
        G::S => vec![one(G::Rz(FRAC_PI_2))],
        G::Sdg => vec![one(G::Rz(-FRAC_PI_2))],
        G::T => vec![one(G::Rz(FRAC_PI_4))],
        G::Tdg => vec![one(G::Rz(-FRAC_PI_4))],
        G::P(theta) => vec![one(G::Rz(theta))],
        G::H => vec![one(G::Rz(FRAC_PI_2)), one(G::SX), one(G::Rz(FRAC_PI_2))],
        G::SXdg => vec![one(G::Rz(PI)), one(G::SX), one(G::Rz(PI))],
        G::Rx(theta) => zsx(theta, -FRAC_PI_2, FRAC_PI_2, qubits[0]),
        G::Ry(theta) => zsx(theta, 0.0, 0.0, qubits[0]),
        G::U(theta, phi, lambda) => zsx(theta, phi, lambda, qubits[0]),
        G::CY => {
            let (c, t) = (qubits[0], qubits[1]);
            vec![
                (G::Sdg, vec![t]),
                (G::CX, vec![c, t]),
                (G::S, vec![t]),
            ]
        }
        G::CZ => {
            let (c, t) = (qubits[0], qubits[1]);
            vec![(G::H, vec![t]), (G::CX, vec![c, t]), (G::H, vec![t])]
        }
        G::Swap => {
            let (a, b) = (qubits[0], qubits[1]);
            vec![
                (G::CX, vec![a, b]),
                (G::CX, vec![b, a]),
                (G::CX, vec![a, b]),
            ]
        }
        G::CCX | G::CSwap => crate::passes::agnostic::unroll::unroll(gate, qubits)?,
        G::X | G::SX | G::Rz(_) | G::CX => return None,
    };
    Some(steps)
}

/// U(θ, φ, λ) = RZ(φ + π) · SX · RZ(θ + π) · SX · RZ(λ), up to global phase.
fn zsx(theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> Vec<Step> {
    [
        StandardGate::Rz(lambda),
        StandardGate::SX,
        StandardGate::Rz(theta + PI),
        StandardGate::SX,
        StandardGate::Rz(phi + PI),
    ]
    .into_iter()
    .filter(|g| !matches!(g, StandardGate::Rz(a) if a.abs() < ANGLE_EPSILON))
    .map(|g| (g, vec![qubit]))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtt_ir::Circuit;

    fn translated(circuit: &Circuit, basis: BasisGates) -> CompileResult<CircuitDag> {
        let mut dag = circuit.dag().clone();
        let mut props = PropertySet::new();
        props.basis_gates = Some(basis);
        BasisTranslation.run(&mut dag, &mut props)?;
        Ok(dag)
    }

    fn names(dag: &CircuitDag) -> Vec<String> {
        dag.topological_ops()
            .map(|(_, i)| i.name().to_string())
            .collect()
    }

    #[test]
    fn test_hadamard_to_ibm() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let dag = translated(&circuit, BasisGates::ibm()).unwrap();
        assert_eq!(names(&dag), vec!["rz", "sx", "rz"]);
    }

    #[test]
    fn test_output_only_contains_basis_gates() {
        let mut circuit = Circuit::with_size("test", 3, 3);
        circuit
            .h(QubitId(0))
            .unwrap()
            .y(QubitId(1))
            .unwrap()
            .rx(0.3, QubitId(2))
            .unwrap()
            .ry(1.1, QubitId(0))
            .unwrap()
            .cz(QubitId(0), QubitId(1))
            .unwrap()
            .cy(QubitId(1), QubitId(2))
            .unwrap()
            .swap(QubitId(0), QubitId(2))
            .unwrap()
            .ccx(QubitId(0), QubitId(1), QubitId(2))
            .unwrap();
        circuit.measure_all().unwrap();

        let basis = BasisGates::ibm();
        let dag = translated(&circuit, basis.clone()).unwrap();
        for (_, inst) in dag.topological_ops() {
            if inst.is_gate() {
                assert!(basis.contains(inst.name()), "{} left over", inst.name());
            }
        }
        assert_eq!(
            dag.topological_ops().filter(|(_, i)| i.is_measure()).count(),
            3
        );
    }

    #[test]
    fn test_gates_in_basis_are_kept() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap().cz(QubitId(0), QubitId(1)).unwrap();
        let dag = translated(&circuit, BasisGates::universal()).unwrap();
        assert_eq!(names(&dag), vec!["h", "cz"]);
    }

    #[test]
    fn test_identity_dropped_when_not_native() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.id(QubitId(0)).unwrap();
        let dag = translated(&circuit, BasisGates::new(["rz", "sx", "x", "cx"])).unwrap();
        assert_eq!(dag.num_ops(), 0);
    }

    #[test]
    fn test_untranslatable_gate() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let err = translated(&circuit, BasisGates::new(["u", "cx"])).unwrap_err();
        assert!(matches!(err, CompileError::GateNotInBasis(_)));
    }
}
