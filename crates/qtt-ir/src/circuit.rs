//! High-level circuit builder API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{CustomGate, Gate, GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// A quantum circuit.
///
/// Thin builder over a [`CircuitDag`]. Gate methods return `&mut Self` so
/// calls can be chained with `?`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CircuitData", into = "CircuitData")]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    dag: CircuitDag,
    next_qubit_id: u32,
    next_clbit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            dag: CircuitDag::new(),
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.qubits.push(Qubit::new(id));
        self.dag.add_qubit(id);
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        (0..size)
            .map(|i| {
                let id = QubitId(self.next_qubit_id);
                self.next_qubit_id += 1;
                self.qubits.push(Qubit::with_register(id, &name, i));
                self.dag.add_qubit(id);
                id
            })
            .collect()
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        self.clbits.push(Clbit::new(id));
        self.dag.add_clbit(id);
        id
    }

    fn one(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::single_qubit_gate(gate, qubit))?;
        Ok(self)
    }

    fn two(&mut self, gate: StandardGate, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::two_qubit_gate(gate, q1, q2))?;
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply identity gate.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::I, qubit)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::X, qubit)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Y, qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Z, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::S, qubit)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Sdg, qubit)
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::T, qubit)
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Tdg, qubit)
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::SX, qubit)
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::SXdg, qubit)
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Rx(theta), qubit)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Ry(theta), qubit)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Rz(theta), qubit)
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::P(theta), qubit)
    }

    /// Apply universal U gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::U(theta, phi, lambda), qubit)
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::CX, control, target)
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::CY, control, target)
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::CZ, control, target)
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::Swap, q1, q2)
    }

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::gate(StandardGate::CCX, [c1, c2, target]))?;
        Ok(self)
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::gate(StandardGate::CSwap, [control, t1, t2]))?;
        Ok(self)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    /// Append a prepared instruction.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure every qubit into a classical bit of the same index, adding
    /// classical bits as needed.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }
        let pairs: Vec<_> = self
            .qubits
            .iter()
            .zip(&self.clbits)
            .map(|(q, c)| (q.id, c.id))
            .collect();
        for (qubit, clbit) in pairs {
            self.dag.apply(Instruction::measure(qubit, clbit))?;
        }
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::reset(qubit))?;
        Ok(self)
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        self.barrier(qubits)
    }

    /// Apply a delay (in `dt`) to a qubit.
    pub fn delay(&mut self, qubit: QubitId, duration: u64) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::delay(qubit, duration))?;
        Ok(self)
    }

    // =========================================================================
    // Accessors and metrics
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Total number of instructions, directives included.
    pub fn size(&self) -> usize {
        self.dag.num_ops()
    }

    /// Instruction counts keyed by name, e.g. `{"cx": 2, "rz": 4}`.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (_, inst) in self.dag.topological_ops() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Instructions in topological order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.dag.topological_ops().map(|(_, inst)| inst)
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Get a mutable reference to the underlying DAG.
    pub fn dag_mut(&mut self) -> &mut CircuitDag {
        &mut self.dag
    }

    /// Consume the circuit and return the DAG.
    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }

    /// Create a circuit from a DAG.
    pub fn from_dag(dag: CircuitDag) -> Self {
        let qubits: Vec<_> = dag.qubits().into_iter().map(Qubit::new).collect();
        let clbits: Vec<_> = dag.clbits().into_iter().map(Clbit::new).collect();
        let next_qubit_id = qubits.last().map_or(0, |q| q.id.0 + 1);
        let next_clbit_id = clbits.last().map_or(0, |c| c.id.0 + 1);

        Self {
            name: "circuit".into(),
            qubits,
            clbits,
            dag,
            next_qubit_id,
            next_clbit_id,
        }
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }

    /// Create a GHZ state circuit with a CNOT chain.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("ghz", n, n);
        if n == 0 {
            return Ok(circuit);
        }

        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        for i in 0..n {
            circuit.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(circuit)
    }
}

/// Serialized form of a [`Circuit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitData {
    /// Circuit name.
    #[serde(default = "default_circuit_name")]
    pub name: String,
    /// Number of qubits.
    pub num_qubits: u32,
    /// Number of classical bits.
    #[serde(default)]
    pub num_clbits: u32,
    /// Global phase in radians.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub global_phase: f64,
    /// Instructions in program order.
    #[serde(default)]
    pub instructions: Vec<InstructionData>,
}

/// One serialized instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionData {
    /// Instruction name (`"cx"`, `"measure"`, `"delay"`, ...).
    pub name: String,
    /// Qubit indices.
    pub qubits: Vec<u32>,
    /// Classical bit indices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clbits: Vec<u32>,
    /// Rotation angles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
    /// Delay duration in `dt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

fn default_circuit_name() -> String {
    "circuit".into()
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

impl From<&Instruction> for InstructionData {
    fn from(inst: &Instruction) -> Self {
        let (params, duration) = match &inst.kind {
            InstructionKind::Gate(gate) => match &gate.kind {
                GateKind::Standard(g) => (g.parameters(), None),
                GateKind::Custom(c) => (c.params.clone(), None),
            },
            InstructionKind::Delay { duration } => (vec![], Some(*duration)),
            _ => (vec![], None),
        };
        Self {
            name: inst.name().to_string(),
            qubits: inst.qubits.iter().map(|q| q.0).collect(),
            clbits: inst.clbits.iter().map(|c| c.0).collect(),
            params,
            duration,
        }
    }
}

impl TryFrom<InstructionData> for Instruction {
    type Error = IrError;

    fn try_from(data: InstructionData) -> IrResult<Self> {
        let qubits: Vec<QubitId> = data.qubits.iter().copied().map(QubitId).collect();
        let clbits: Vec<ClbitId> = data.clbits.iter().copied().map(ClbitId).collect();
        let invalid = |reason: &str| IrError::InvalidInstruction {
            name: data.name.clone(),
            reason: reason.to_string(),
        };

        let inst = match data.name.as_str() {
            "measure" => match (qubits.as_slice(), clbits.as_slice()) {
                ([q], [c]) => Instruction::measure(*q, *c),
                _ => return Err(invalid("expects one qubit and one classical bit")),
            },
            "reset" => match qubits.as_slice() {
                [q] => Instruction::reset(*q),
                _ => return Err(invalid("expects one qubit")),
            },
            "barrier" => Instruction::barrier(qubits),
            "delay" => match (qubits.as_slice(), data.duration) {
                ([q], Some(d)) => Instruction::delay(*q, d),
                _ => return Err(invalid("expects one qubit and a duration")),
            },
            name => match StandardGate::from_name(name, &data.params) {
                Some(gate) => Instruction::gate(gate, qubits),
                None => {
                    #[allow(clippy::cast_possible_truncation)]
                    let custom = CustomGate::new(name, qubits.len() as u32)
                        .with_params(data.params.clone());
                    Instruction::gate(custom, qubits)
                }
            },
        };
        Ok(inst)
    }
}

impl From<Circuit> for CircuitData {
    fn from(circuit: Circuit) -> Self {
        Self {
            name: circuit.name.clone(),
            num_qubits: circuit.next_qubit_id,
            num_clbits: circuit.next_clbit_id,
            global_phase: circuit.dag.global_phase(),
            instructions: circuit.instructions().map(InstructionData::from).collect(),
        }
    }
}

impl TryFrom<CircuitData> for Circuit {
    type Error = IrError;

    fn try_from(data: CircuitData) -> IrResult<Self> {
        let mut circuit = Circuit::with_size(data.name, data.num_qubits, data.num_clbits);
        circuit.dag.set_global_phase(data.global_phase);
        for inst in data.instructions {
            circuit.append(Instruction::try_from(inst)?)?;
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 3, 2);
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.depth(), 0);
    }

    #[test]
    fn test_bell_state() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.depth(), 3); // H, CX, parallel measures
        assert_eq!(circuit.size(), 4);
    }

    #[test]
    fn test_ghz_counts() {
        let circuit = Circuit::ghz(5).unwrap();
        let ops = circuit.count_ops();
        assert_eq!(ops.get("h"), Some(&1));
        assert_eq!(ops.get("cx"), Some(&4));
        assert_eq!(ops.get("measure"), Some(&5));
        assert_eq!(circuit.depth(), 6);
    }

    #[test]
    fn test_two_cnots() {
        let mut circuit = Circuit::with_size("two_cnots", 2, 0);
        circuit
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .cx(QubitId(1), QubitId(0))
            .unwrap();
        assert_eq!(circuit.depth(), 2);
        assert_eq!(circuit.count_ops().get("cx"), Some(&2));
    }

    #[test]
    fn test_measure_all_adds_clbits() {
        let mut circuit = Circuit::with_size("m", 3, 1);
        circuit.h(QubitId(0)).unwrap().measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(circuit.count_ops().get("measure"), Some(&3));
    }

    #[test]
    fn test_from_dag_keeps_wires() {
        let mut circuit = Circuit::with_size("x", 2, 1);
        circuit.rz(PI / 2.0, QubitId(1)).unwrap();
        let rebuilt = Circuit::from_dag(circuit.dag().clone());
        assert_eq!(rebuilt.num_qubits(), 2);
        assert_eq!(rebuilt.num_clbits(), 1);
        assert_eq!(rebuilt.count_ops(), circuit.count_ops());
    }

    #[test]
    fn test_json_roundtrip_keeps_structure() {
        let mut circuit = Circuit::with_size("mixed", 3, 1);
        circuit
            .h(QubitId(0))
            .unwrap()
            .rz(0.25, QubitId(1))
            .unwrap()
            .delay(QubitId(2), 320)
            .unwrap()
            .barrier_all()
            .unwrap()
            .gate(CustomGate::new("ecr", 2), [QubitId(0), QubitId(2)])
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();

        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();

        assert_eq!(back.name(), "mixed");
        assert_eq!(back.count_ops(), circuit.count_ops());
        assert_eq!(back.depth(), circuit.depth());
        let original: Vec<_> = circuit.instructions().cloned().collect();
        let parsed: Vec<_> = back.instructions().cloned().collect();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_parse_minimal_json() {
        let json = r#"{
            "num_qubits": 2,
            "instructions": [
                {"name": "h", "qubits": [0]},
                {"name": "cx", "qubits": [0, 1]}
            ]
        }"#;
        let circuit: Circuit = serde_json::from_str(json).unwrap();
        assert_eq!(circuit.name(), "circuit");
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_parse_rejects_out_of_range_qubit() {
        let json = r#"{"num_qubits": 1, "instructions": [{"name": "cx", "qubits": [0, 1]}]}"#;
        let err = serde_json::from_str::<Circuit>(json).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
