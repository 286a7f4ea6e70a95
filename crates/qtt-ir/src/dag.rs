//! DAG-based circuit representation.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, DagNode::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// Whether the qubits of a circuit are still virtual or already physical.
///
/// Routing lowers a circuit from `Logical` to `Physical`; after that the
/// qubit ids are device indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CircuitLevel {
    /// Qubits are abstract.
    #[default]
    Logical,
    /// Qubits are device positions.
    Physical,
}

/// DAG-based circuit representation.
///
/// - Nodes are input nodes, output nodes, or operation nodes
/// - Edges are wires (quantum or classical)
/// - Each wire runs from exactly one input node to one output node
///
/// The DAG is append-only: operations are only ever added at the wire
/// fronts, so node index order is a topological order. Passes that rewrite
/// a circuit build a fresh DAG and swap it in.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    inputs: FxHashMap<WireId, NodeIndex>,
    outputs: FxHashMap<WireId, NodeIndex>,
    /// Last node on each wire before its output node.
    wire_front: FxHashMap<WireId, NodeIndex>,
    num_qubits: usize,
    num_clbits: usize,
    global_phase: f64,
    level: CircuitLevel,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit to the circuit. Adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.add_wire(WireId::Qubit(qubit)) {
            self.num_qubits += 1;
        }
    }

    /// Add a classical bit to the circuit. Adding an existing bit is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.add_wire(WireId::Clbit(clbit)) {
            self.num_clbits += 1;
        }
    }

    fn add_wire(&mut self, wire: WireId) -> bool {
        if self.inputs.contains_key(&wire) {
            return false;
        }
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.inputs.insert(wire, in_node);
        self.outputs.insert(wire, out_node);
        self.wire_front.insert(wire, in_node);
        true
    }

    /// Append an instruction at the end of its wires.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits();
            let got = instruction.qubits.len() as u32;
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected,
                    got,
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.inputs.contains_key(&WireId::Qubit(qubit)) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }
        for &clbit in &instruction.clbits {
            if !self.inputs.contains_key(&WireId::Clbit(clbit)) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
            .collect();

        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for wire in wires {
            let out_node = self.outputs[&wire];
            let prev_node = self.wire_front[&wire];

            let edge = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!("wire {wire:?} is not connected to its output"))
                })?;
            self.graph.remove_edge(edge);
            self.graph.add_edge(prev_node, op_node, DagEdge { wire });
            self.graph.add_edge(op_node, out_node, DagEdge { wire });
            self.wire_front.insert(wire, op_node);
        }

        Ok(op_node)
    }

    /// Operations in topological order (which is insertion order).
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// The operation nodes on a qubit wire, in order.
    pub fn wire_ops(&self, qubit: QubitId) -> Vec<NodeIndex> {
        let wire = WireId::Qubit(qubit);
        let (Some(&start), Some(&end)) = (self.inputs.get(&wire), self.outputs.get(&wire)) else {
            return vec![];
        };

        let mut ops = vec![];
        let mut current = start;
        while current != end {
            let next = self
                .graph
                .edges_directed(current, Direction::Outgoing)
                .find(|e| e.weight().wire == wire)
                .map(|e| e.target());
            match next {
                Some(n) if n != end => {
                    ops.push(n);
                    current = n;
                }
                _ => break,
            }
        }
        ops
    }

    /// Operation nodes feeding directly into `node`.
    pub fn op_predecessors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| e.source())
            .filter(|&n| self.graph[n].is_op())
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph.node_count().saturating_sub(2 * self.inputs.len())
    }

    /// Length of the longest path through the circuit.
    ///
    /// Directives (barriers) contribute no layer but still order the
    /// operations around them.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.graph.node_count()];
        let mut max_depth = 0;

        for node in self.graph.node_indices() {
            let max_pred = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths[e.source().index()])
                .max()
                .unwrap_or(0);

            let node_depth = match &self.graph[node] {
                DagNode::Op(inst) if !inst.is_directive() => max_pred + 1,
                _ => max_pred,
            };
            depths[node.index()] = node_depth;
            max_depth = max_depth.max(node_depth);
        }

        max_depth
    }

    /// Qubits in ascending order.
    pub fn qubits(&self) -> Vec<QubitId> {
        let mut qubits: Vec<_> = self
            .inputs
            .keys()
            .filter_map(|w| match w {
                WireId::Qubit(q) => Some(*q),
                WireId::Clbit(_) => None,
            })
            .collect();
        qubits.sort_unstable();
        qubits
    }

    /// Classical bits in ascending order.
    pub fn clbits(&self) -> Vec<ClbitId> {
        let mut clbits: Vec<_> = self
            .inputs
            .keys()
            .filter_map(|w| match w {
                WireId::Clbit(c) => Some(*c),
                WireId::Qubit(_) => None,
            })
            .collect();
        clbits.sort_unstable();
        clbits
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }

    /// Get the abstraction level of this circuit.
    pub fn level(&self) -> CircuitLevel {
        self.level
    }

    /// Set the abstraction level of this circuit.
    pub fn set_level(&mut self, level: CircuitLevel) {
        self.level = level;
    }

    /// An empty DAG with the same wires, phase and level.
    pub fn copy_empty_like(&self) -> Self {
        let mut dag = Self::new();
        for q in self.qubits() {
            dag.add_qubit(q);
        }
        for c in self.clbits() {
            dag.add_clbit(c);
        }
        dag.global_phase = self.global_phase;
        dag.level = self.level;
        dag
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &DiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// The graph must be acyclic and every wire must run unbroken from its
    /// input node to its output node.
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("graph contains a cycle".into()));
        }

        for (&wire, &in_node) in &self.inputs {
            let out_node = *self.outputs.get(&wire).ok_or_else(|| {
                IrError::InvalidDag(format!("wire {wire:?} has an input but no output"))
            })?;

            let mut current = in_node;
            let mut steps = 0;
            while current != out_node {
                current = self
                    .graph
                    .edges_directed(current, Direction::Outgoing)
                    .find(|e| e.weight().wire == wire)
                    .map(|e| e.target())
                    .ok_or_else(|| {
                        IrError::InvalidDag(format!(
                            "wire {wire:?} is broken after node {current:?}"
                        ))
                    })?;
                steps += 1;
                if steps > self.graph.node_count() {
                    return Err(IrError::InvalidDag(format!("wire {wire:?} does not terminate")));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn dag_with(qubits: u32, clbits: u32) -> CircuitDag {
        let mut dag = CircuitDag::new();
        for q in 0..qubits {
            dag.add_qubit(QubitId(q));
        }
        for c in 0..clbits {
            dag.add_clbit(ClbitId(c));
        }
        dag
    }

    #[test]
    fn test_empty_dag() {
        let dag = CircuitDag::new();
        assert_eq!(dag.num_qubits(), 0);
        assert_eq!(dag.num_ops(), 0);
        assert_eq!(dag.depth(), 0);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_add_qubit_twice() {
        let mut dag = dag_with(2, 0);
        dag.add_qubit(QubitId(1));
        assert_eq!(dag.num_qubits(), 2);
        assert_eq!(dag.qubits(), vec![QubitId(0), QubitId(1)]);
    }

    #[test]
    fn test_bell_state_depth() {
        let mut dag = dag_with(2, 2);
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            QubitId(0),
            QubitId(1),
        ))
        .unwrap();
        dag.apply(Instruction::measure(QubitId(0), ClbitId(0)))
            .unwrap();
        dag.apply(Instruction::measure(QubitId(1), ClbitId(1)))
            .unwrap();

        assert_eq!(dag.num_ops(), 4);
        assert_eq!(dag.depth(), 3);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_parallel_gates_depth() {
        let mut dag = dag_with(2, 0);
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(1)))
            .unwrap();
        assert_eq!(dag.depth(), 1);
    }

    #[test]
    fn test_barrier_adds_no_depth() {
        let mut dag = dag_with(2, 0);
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::barrier([QubitId(0), QubitId(1)]))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(1)))
            .unwrap();
        // The barrier orders X after H without adding a layer itself.
        assert_eq!(dag.depth(), 2);
    }

    #[test]
    fn test_gate_arity_mismatch() {
        let mut dag = dag_with(2, 0);
        let result = dag.apply(Instruction::gate(StandardGate::CX, [QubitId(0)]));
        match result {
            Err(IrError::QubitCountMismatch {
                gate_name,
                expected,
                got,
            }) => {
                assert_eq!(gate_name, "cx");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("expected QubitCountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_qubit_not_found_with_context() {
        let mut dag = dag_with(1, 0);
        let result = dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            QubitId(0),
            QubitId(99),
        ));
        match result {
            Err(IrError::QubitNotFound { qubit, gate_name }) => {
                assert_eq!(qubit, QubitId(99));
                assert_eq!(gate_name, Some("cx".to_string()));
            }
            other => panic!("expected QubitNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut dag = dag_with(2, 0);
        let result = dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            QubitId(1),
            QubitId(1),
        ));
        assert!(matches!(result, Err(IrError::DuplicateQubit { .. })));
        assert_eq!(dag.num_ops(), 0);
    }

    #[test]
    fn test_wire_ops_and_order() {
        let mut dag = dag_with(2, 0);
        let h = dag
            .apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        let cx = dag
            .apply(Instruction::two_qubit_gate(
                StandardGate::CX,
                QubitId(0),
                QubitId(1),
            ))
            .unwrap();

        assert_eq!(dag.wire_ops(QubitId(0)), vec![h, cx]);
        assert_eq!(dag.wire_ops(QubitId(1)), vec![cx]);
        assert_eq!(dag.op_predecessors(cx).collect::<Vec<_>>(), vec![h]);

        let names: Vec<_> = dag.topological_ops().map(|(_, i)| i.name()).collect();
        assert_eq!(names, vec!["h", "cx"]);
    }

    #[test]
    fn test_copy_empty_like() {
        let mut dag = dag_with(3, 1);
        dag.set_level(CircuitLevel::Physical);
        dag.set_global_phase(0.5);
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(2)))
            .unwrap();

        let empty = dag.copy_empty_like();
        assert_eq!(empty.num_qubits(), 3);
        assert_eq!(empty.num_clbits(), 1);
        assert_eq!(empty.num_ops(), 0);
        assert_eq!(empty.level(), CircuitLevel::Physical);
        assert!((empty.global_phase() - 0.5).abs() < 1e-12);
    }
}
