//! As-late-as-possible scheduling.

use rustc_hash::FxHashMap;
use tracing::debug;

use qtt_ir::{CircuitDag, NodeIndex, WireId};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::scheduling::durations::InstructionDurations;

/// Start times of every operation, in `dt`.
///
/// Stored in the `PropertySet` by [`ALAPScheduleAnalysis`] and rewritten by
/// padding passes for the DAG they produce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    /// Start time of each operation node.
    pub start_times: FxHashMap<NodeIndex, u64>,
    /// End time of the last operation.
    pub duration: u64,
}

impl Schedule {
    /// Start time of `node`.
    pub fn start(&self, node: NodeIndex) -> Option<u64> {
        self.start_times.get(&node).copied()
    }
}

/// Schedules every operation as late as its successors allow.
///
/// Walks the DAG backwards; each operation ends when the earliest
/// operation after it on any of its wires (qubits and classical bits)
/// begins. The resulting [`Schedule`] is written to the `PropertySet`.
pub struct ALAPScheduleAnalysis {
    durations: InstructionDurations,
}

impl ALAPScheduleAnalysis {
    /// Create the analysis with the given durations.
    pub fn new(durations: InstructionDurations) -> Self {
        Self { durations }
    }
}

impl Pass for ALAPScheduleAnalysis {
    fn name(&self) -> &'static str {
        "ALAPScheduleAnalysis"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let ops: Vec<_> = dag.topological_ops().collect();

        // Time from the end of the circuit back to the front of each wire.
        let mut idle_before: FxHashMap<WireId, u64> = FxHashMap::default();
        let mut from_end = Vec::with_capacity(ops.len());

        for &(node, inst) in ops.iter().rev() {
            let duration = self.durations.get(inst)?;
            let wires: Vec<WireId> = inst
                .qubits
                .iter()
                .map(|&q| WireId::Qubit(q))
                .chain(inst.clbits.iter().map(|&c| WireId::Clbit(c)))
                .collect();

            let t1 = wires
                .iter()
                .map(|w| idle_before.get(w).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            for wire in wires {
                idle_before.insert(wire, t1 + duration);
            }
            from_end.push((node, t1 + duration));
        }

        let total = idle_before.values().copied().max().unwrap_or(0);
        let start_times = from_end
            .into_iter()
            .map(|(node, end_offset)| (node, total - end_offset))
            .collect();

        debug!("ALAP schedule: {} ops over {} dt", ops.len(), total);
        properties.insert(Schedule {
            start_times,
            duration: total,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtt_ir::{Circuit, ClbitId, QubitId};

    fn durations() -> InstructionDurations {
        let mut d = InstructionDurations::new();
        for q in 0..3 {
            d.insert("x", vec![q], 160);
            d.insert("rz", vec![q], 0);
            d.insert("measure", vec![q], 1600);
        }
        d.insert("cx", vec![0, 1], 800);
        d.insert("cx", vec![1, 2], 960);
        d
    }

    fn schedule(circuit: &Circuit) -> (CircuitDag, Schedule) {
        let mut dag = circuit.dag().clone();
        let mut props = PropertySet::new();
        ALAPScheduleAnalysis::new(durations())
            .run(&mut dag, &mut props)
            .unwrap();
        let schedule = props.remove::<Schedule>().unwrap();
        (dag, schedule)
    }

    #[test]
    fn test_single_gate_pushed_late() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.x(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.x(QubitId(1)).unwrap();
        circuit.x(QubitId(1)).unwrap();

        let (dag, schedule) = schedule(&circuit);
        let starts: Vec<u64> = dag
            .topological_ops()
            .map(|(n, _)| schedule.start(n).unwrap())
            .collect();
        assert_eq!(schedule.duration, 160 + 800 + 320);
        assert_eq!(starts, vec![0, 160, 960, 1120]);
    }

    #[test]
    fn test_idle_qubit_gate_is_late() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.x(QubitId(2)).unwrap();

        let (dag, schedule) = schedule(&circuit);
        let (x, _) = dag.topological_ops().last().unwrap();
        assert_eq!(schedule.duration, 800);
        assert_eq!(schedule.start(x), Some(640));
    }

    #[test]
    fn test_measure_orders_classical_wires() {
        let mut circuit = Circuit::with_size("test", 2, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.measure(QubitId(1), ClbitId(0)).unwrap();

        let (dag, schedule) = schedule(&circuit);
        let starts: Vec<u64> = dag
            .topological_ops()
            .map(|(n, _)| schedule.start(n).unwrap())
            .collect();
        assert_eq!(starts, vec![0, 1600]);
        assert_eq!(schedule.duration, 3200);
    }

    #[test]
    fn test_missing_duration_fails() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let mut dag = circuit.into_dag();
        let result = ALAPScheduleAnalysis::new(durations()).run(&mut dag, &mut PropertySet::new());
        assert!(result.is_err());
    }
}
