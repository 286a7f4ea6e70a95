//! qtt Circuit Intermediate Representation
//!
//! Core data structures for the quantum circuits that flow through the qtt
//! transpilation pipeline: qubits, gates, instructions, a DAG representation
//! and a builder-style [`Circuit`] API.
//!
//! # Overview
//!
//! Circuits are stored as a DAG (Directed Acyclic Graph) where every wire runs
//! from an input node to an output node through the operations that touch it.
//! Compilation passes rewrite the DAG; the pipeline only ever looks at circuits
//! through the read-only metrics [`Circuit::depth`] and [`Circuit::count_ops`].
//!
//! # Example: Two CNOTs
//!
//! ```rust
//! use qtt_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("two_cnots", 2, 0);
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.cx(QubitId(1), QubitId(0)).unwrap();
//!
//! assert_eq!(circuit.depth(), 2);
//! assert_eq!(circuit.count_ops().get("cx"), Some(&2));
//! ```
//!
//! # Serialized form
//!
//! [`Circuit`] serializes through [`CircuitData`], a flat list of
//! instructions plus register sizes:
//!
//! ```rust
//! use qtt_ir::Circuit;
//!
//! let bell = Circuit::bell().unwrap();
//! let json = serde_json::to_string(&bell).unwrap();
//! let back: Circuit = serde_json::from_str(&json).unwrap();
//! assert_eq!(back.count_ops(), bell.count_ops());
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Identity and Pauli gates |
//! | `H`, `S`, `Sdg`, `T`, `Tdg`, `SX`, `SXdg` | 1 | Clifford+T gates |
//! | `Rx`, `Ry`, `Rz`, `P`, `U` | 1 | Rotation and universal gates |
//! | `CX`, `CY`, `CZ`, `Swap` | 2 | Controlled gates and SWAP |
//! | `CCX`, `CSwap` | 3 | Toffoli and Fredkin |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, CircuitData, InstructionData};
pub use dag::{CircuitDag, CircuitLevel, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
