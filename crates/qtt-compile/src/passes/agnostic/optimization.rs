//! Peephole optimization passes.

use std::f64::consts::{PI, TAU};

use rustc_hash::FxHashMap;
use tracing::debug;

use qtt_ir::{CircuitDag, Instruction, QubitId, StandardGate};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Tolerance for treating a rotation angle as zero.
const EPSILON: f64 = 1e-10;

/// Instructions in order with per-qubit stacks of the live entries, so a
/// pass can look at "the previous operation on this qubit" and retract it.
struct Peephole {
    entries: Vec<Option<Instruction>>,
    stacks: FxHashMap<QubitId, Vec<usize>>,
}

impl Peephole {
    fn new() -> Self {
        Self {
            entries: vec![],
            stacks: FxHashMap::default(),
        }
    }

    /// Index of the last live entry on `qubit`.
    fn last_on(&self, qubit: QubitId) -> Option<usize> {
        self.stacks.get(&qubit).and_then(|s| s.last().copied())
    }

    fn push(&mut self, inst: Instruction) {
        let index = self.entries.len();
        for &q in &inst.qubits {
            self.stacks.entry(q).or_default().push(index);
        }
        self.entries.push(Some(inst));
    }

    /// Retract entry `index`, which must be on top of all its qubit stacks.
    fn pop(&mut self, index: usize) {
        if let Some(inst) = self.entries[index].take() {
            for q in &inst.qubits {
                if let Some(stack) = self.stacks.get_mut(q) {
                    stack.pop();
                }
            }
        }
    }

    fn into_dag(self, template: &CircuitDag) -> CompileResult<CircuitDag> {
        let mut dag = template.copy_empty_like();
        for inst in self.entries.into_iter().flatten() {
            dag.apply(inst)?;
        }
        Ok(dag)
    }
}

/// CX cancellation pass.
///
/// Cancels pairs of CX gates on the same control and target with nothing
/// in between on either qubit. Cancelling one pair can expose another, so
/// `cx a,b; cx a,b; cx a,b; cx a,b` disappears entirely.
pub struct CancelCX;

impl Pass for CancelCX {
    fn name(&self) -> &'static str {
        "CancelCX"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut peephole = Peephole::new();
        let mut cancelled = 0;

        for (_, inst) in dag.topological_ops() {
            if inst.as_standard_gate() == Some(StandardGate::CX) {
                let (c, t) = (inst.qubits[0], inst.qubits[1]);
                if let (Some(i), Some(j)) = (peephole.last_on(c), peephole.last_on(t)) {
                    let matches = i == j
                        && peephole.entries[i]
                            .as_ref()
                            .is_some_and(|prev| prev == inst);
                    if matches {
                        peephole.pop(i);
                        cancelled += 1;
                        continue;
                    }
                }
            }
            peephole.push(inst.clone());
        }

        if cancelled > 0 {
            debug!("Cancelled {} CX pairs", cancelled);
            *dag = peephole.into_dag(dag)?;
        }
        Ok(())
    }
}

/// RZ merging pass.
///
/// Folds runs of RZ rotations on a qubit into one rotation with its angle
/// wrapped into (-π, π], and drops rotations that end up at zero. Each full
/// turn removed adds π to the global phase.
pub struct MergeRz;

impl MergeRz {
    /// Wrap `theta` into (-π, π]; returns the wrapped angle and the number of
    /// full turns removed.
    #[allow(clippy::cast_possible_truncation)]
    fn wrap(theta: f64) -> (f64, i64) {
        let turns = ((theta + PI) / TAU).ceil() - 1.0;
        let wrapped = theta - turns * TAU;
        (wrapped, turns as i64)
    }
}

impl Pass for MergeRz {
    fn name(&self) -> &'static str {
        "MergeRz"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut peephole = Peephole::new();

        for (_, inst) in dag.topological_ops() {
            if let Some(StandardGate::Rz(theta)) = inst.as_standard_gate() {
                let q = inst.qubits[0];
                if let Some(i) = peephole.last_on(q) {
                    let prev = peephole.entries[i]
                        .as_ref()
                        .and_then(Instruction::as_standard_gate);
                    if let Some(StandardGate::Rz(prev_theta)) = prev {
                        let merged = StandardGate::Rz(prev_theta + theta);
                        peephole.entries[i] = Some(Instruction::single_qubit_gate(merged, q));
                        continue;
                    }
                }
            }
            peephole.push(inst.clone());
        }

        let mut phase_turns = 0;
        let mut dropped = 0;
        for entry in &mut peephole.entries {
            let gate = entry.as_ref().and_then(Instruction::as_standard_gate);
            let Some(StandardGate::Rz(theta)) = gate else {
                continue;
            };
            let (wrapped, turns) = Self::wrap(theta);
            phase_turns += turns;
            if let Some(inst) = entry.take() {
                if wrapped.abs() < EPSILON {
                    dropped += 1;
                } else {
                    *entry = Some(Instruction::single_qubit_gate(
                        StandardGate::Rz(wrapped),
                        inst.qubits[0],
                    ));
                }
            }
        }

        let before = dag.num_ops();
        let mut new_dag = peephole.into_dag(dag)?;
        if phase_turns != 0 {
            #[allow(clippy::cast_precision_loss)]
            let phase = (new_dag.global_phase() + PI * phase_turns as f64).rem_euclid(TAU);
            new_dag.set_global_phase(phase);
        }
        debug!(
            "MergeRz: {} -> {} ops, {} zero rotations dropped",
            before,
            new_dag.num_ops(),
            dropped
        );
        *dag = new_dag;
        Ok(())
    }
}

/// Repeats a list of passes until the operation count and depth stop
/// changing, or `max_iterations` is reached.
pub struct FixedPoint {
    passes: Vec<Box<dyn Pass>>,
    max_iterations: usize,
}

impl FixedPoint {
    /// Create a loop over `passes`.
    pub fn new(passes: Vec<Box<dyn Pass>>, max_iterations: usize) -> Self {
        Self {
            passes,
            max_iterations,
        }
    }
}

impl Pass for FixedPoint {
    fn name(&self) -> &'static str {
        "FixedPoint"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let mut last = (dag.num_ops(), dag.depth());
        for iteration in 0..self.max_iterations {
            for pass in &self.passes {
                if pass.should_run(dag, properties) {
                    pass.run(dag, properties)?;
                }
            }
            let current = (dag.num_ops(), dag.depth());
            if current == last {
                debug!("Fixed point reached after {} iterations", iteration + 1);
                break;
            }
            last = current;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtt_ir::{Circuit, ClbitId};

    fn run(pass: &dyn Pass, circuit: &Circuit) -> CircuitDag {
        let mut dag = circuit.dag().clone();
        pass.run(&mut dag, &mut PropertySet::new()).unwrap();
        dag
    }

    #[test]
    fn test_cancel_adjacent_cx() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        let dag = run(&CancelCX, &circuit);
        assert_eq!(dag.num_ops(), 1);
    }

    #[test]
    fn test_cancel_nested_pairs() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        for _ in 0..4 {
            circuit.cx(QubitId(0), QubitId(1)).unwrap();
        }
        assert_eq!(run(&CancelCX, &circuit).num_ops(), 0);
    }

    #[test]
    fn test_reversed_cx_not_cancelled() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(0)).unwrap();
        assert_eq!(run(&CancelCX, &circuit).num_ops(), 2);
    }

    #[test]
    fn test_blocked_cx_not_cancelled() {
        let mut circuit = Circuit::with_size("test", 2, 1);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure(QubitId(1), ClbitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        assert_eq!(run(&CancelCX, &circuit).num_ops(), 3);
    }

    #[test]
    fn test_merge_rz() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.rz(0.25, QubitId(0)).unwrap();
        circuit.rz(0.5, QubitId(1)).unwrap();
        circuit.rz(0.5, QubitId(0)).unwrap();
        let dag = run(&MergeRz, &circuit);

        let angles: Vec<_> = dag
            .topological_ops()
            .filter_map(|(_, i)| match i.as_standard_gate() {
                Some(StandardGate::Rz(t)) => Some((i.qubits[0], t)),
                _ => None,
            })
            .collect();
        assert_eq!(angles.len(), 2);
        assert_eq!(angles[0].0, QubitId(0));
        assert!((angles[0].1 - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_merge_rz_drops_full_turn() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.rz(PI, QubitId(0)).unwrap();
        circuit.rz(PI, QubitId(0)).unwrap();
        let dag = run(&MergeRz, &circuit);
        assert_eq!(dag.num_ops(), 0);
        assert!((dag.global_phase() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_wrap() {
        let (w, turns) = MergeRz::wrap(PI);
        assert!((w - PI).abs() < 1e-12);
        assert_eq!(turns, 0);

        let (w, turns) = MergeRz::wrap(-PI);
        assert!((w - PI).abs() < 1e-12);
        assert_eq!(turns, -1);

        let (w, turns) = MergeRz::wrap(3.0 * PI / 2.0);
        assert!((w + PI / 2.0).abs() < 1e-12);
        assert_eq!(turns, 1);
    }

    #[test]
    fn test_fixed_point_exposes_cancellation() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.rz(0.5, QubitId(1)).unwrap();
        circuit.rz(-0.5, QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let single = run(&CancelCX, &circuit);
        assert_eq!(single.num_ops(), 4);

        let looped = FixedPoint::new(vec![Box::new(CancelCX), Box::new(MergeRz)], 5);
        assert_eq!(run(&looped, &circuit).num_ops(), 0);
    }
}
