//! Routing passes for inserting SWAP gates.

use rand::Rng;
use tracing::debug;

use qtt_ir::{CircuitDag, CircuitLevel, Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::passes::target::layout::seeded_rng;
use crate::property::{CouplingMap, Layout, PropertySet};

/// Stochastic routing pass.
///
/// Rewrites the circuit onto the device's physical qubits. Whenever a
/// two-qubit gate acts on qubits that are not coupled, the first operand is
/// swapped along a shortest path towards the second; at every hop the next
/// qubit is drawn at random among those that get one step closer. The seed
/// fixes those draws, so the same seed reproduces the same circuit.
///
/// The initial layout stays in `PropertySet::layout`; where each logical
/// qubit ends up is stored in `PropertySet::final_layout`.
#[derive(Debug, Clone, Default)]
pub struct StochasticRouting {
    seed: Option<u64>,
}

impl StochasticRouting {
    /// Create a routing pass. `None` draws fresh entropy on each run.
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    fn physical_of(layout: &Layout, qubit: QubitId) -> CompileResult<QubitId> {
        layout
            .get_physical(qubit)
            .map(QubitId)
            .ok_or(CompileError::MissingLayout)
    }

    fn route_pair<R: Rng>(
        coupling_map: &CouplingMap,
        layout: &mut Layout,
        out: &mut CircuitDag,
        p0: u32,
        p1: u32,
        rng: &mut R,
    ) -> CompileResult<usize> {
        let path = coupling_map
            .random_shortest_path(p0, p1, rng)
            .ok_or(CompileError::RoutingFailed {
                qubit1: p0,
                qubit2: p1,
            })?;

        // Walk p0 down the path until it sits next to p1.
        let hops = path.len().saturating_sub(2);
        for pair in path.windows(2).take(hops) {
            out.apply(Instruction::two_qubit_gate(
                StandardGate::Swap,
                QubitId(pair[0]),
                QubitId(pair[1]),
            ))?;
            layout.swap(pair[0], pair[1]);
        }
        Ok(hops)
    }
}

impl Pass for StochasticRouting {
    fn name(&self) -> &'static str {
        "StochasticRouting"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        let mut layout = properties
            .layout
            .clone()
            .ok_or(CompileError::MissingLayout)?;

        let mut out = CircuitDag::new();
        for p in 0..coupling_map.num_qubits() {
            out.add_qubit(QubitId(p));
        }
        for c in dag.clbits() {
            out.add_clbit(c);
        }
        out.set_global_phase(dag.global_phase());
        out.set_level(CircuitLevel::Physical);

        let mut rng = seeded_rng(self.seed);
        let mut swaps = 0;

        for (_, inst) in dag.topological_ops() {
            if inst.is_gate() && inst.qubits.len() > 2 {
                return Err(CompileError::InvalidConfiguration(format!(
                    "cannot route {}-qubit gate '{}'; unroll it first",
                    inst.qubits.len(),
                    inst.name()
                )));
            }

            if inst.is_gate() && inst.qubits.len() == 2 {
                let p0 = Self::physical_of(&layout, inst.qubits[0])?.0;
                let p1 = Self::physical_of(&layout, inst.qubits[1])?.0;
                if !coupling_map.is_connected(p0, p1) {
                    swaps +=
                        Self::route_pair(coupling_map, &mut layout, &mut out, p0, p1, &mut rng)?;
                }
            }

            let mut mapped = inst.clone();
            for q in &mut mapped.qubits {
                *q = Self::physical_of(&layout, *q)?;
            }
            out.apply(mapped)?;
        }

        debug!("Inserted {} SWAP gates", swaps);
        *dag = out;
        properties.final_layout = Some(layout);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some() && properties.layout.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::target::layout::TrivialLayout;
    use crate::property::BasisGates;
    use qtt_ir::Circuit;

    fn route(circuit: &Circuit, map: CouplingMap, seed: u64) -> (CircuitDag, PropertySet) {
        let mut dag = circuit.dag().clone();
        let mut props = PropertySet::new().with_target(map, BasisGates::ibm());
        TrivialLayout.run(&mut dag, &mut props).unwrap();
        StochasticRouting::new(Some(seed))
            .run(&mut dag, &mut props)
            .unwrap();
        (dag, props)
    }

    #[test]
    fn test_routing_connected() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let (dag, props) = route(&circuit, CouplingMap::linear(5), 1);
        assert_eq!(dag.num_ops(), 2);
        assert_eq!(dag.num_qubits(), 5);
        assert_eq!(dag.level(), CircuitLevel::Physical);
        assert_eq!(props.final_layout, props.layout);
    }

    #[test]
    fn test_routing_needs_swap() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();

        let (dag, props) = route(&circuit, CouplingMap::linear(5), 1);
        let names: Vec<_> = dag.topological_ops().map(|(_, i)| i.name()).collect();
        assert_eq!(names, vec!["swap", "cx"]);

        let final_layout = props.final_layout.unwrap();
        assert_eq!(final_layout.get_physical(QubitId(0)), Some(1));
        assert_eq!(final_layout.get_physical(QubitId(1)), Some(0));
    }

    #[test]
    fn test_routed_gates_respect_coupling() {
        let map = CouplingMap::from_edges(7, [(0, 1), (1, 2), (1, 3), (3, 5), (4, 5), (5, 6)]);
        let mut circuit = Circuit::with_size("test", 7, 0);
        for (a, b) in [(0, 6), (2, 4), (6, 1), (3, 0), (4, 2)] {
            circuit.cx(QubitId(a), QubitId(b)).unwrap();
        }

        let (dag, _) = route(&circuit, map.clone(), 5);
        for (_, inst) in dag.topological_ops() {
            assert!(map.is_connected(inst.qubits[0].0, inst.qubits[1].0));
        }
        assert_eq!(dag.topological_ops().filter(|(_, i)| i.name() == "cx").count(), 5);
    }

    #[test]
    fn test_routing_keeps_measurements() {
        let circuit = Circuit::bell().unwrap();
        let (dag, _) = route(&circuit, CouplingMap::linear(3), 0);
        assert_eq!(dag.num_clbits(), 2);
        assert_eq!(
            dag.topological_ops().filter(|(_, i)| i.is_measure()).count(),
            2
        );
    }

    #[test]
    fn test_routing_disconnected_fails() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let mut dag = circuit.into_dag();
        let mut props =
            PropertySet::new().with_target(CouplingMap::from_edges(2, []), BasisGates::ibm());
        TrivialLayout.run(&mut dag, &mut props).unwrap();
        let err = StochasticRouting::new(Some(0))
            .run(&mut dag, &mut props)
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::RoutingFailed {
                qubit1: 0,
                qubit2: 1
            }
        ));
    }
}
