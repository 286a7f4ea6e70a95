//! Error types for noise-aware re-layout.

use thiserror::Error;

/// Errors that can occur while re-laying out a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemapError {
    /// No injective placement maps every interaction onto a coupling edge.
    #[error("No layout of the {num_qubits}-qubit circuit fits the coupling map of '{backend}'")]
    NoMatchingLayout { backend: String, num_qubits: usize },

    /// Interaction graphs are built from one- and two-qubit operations only.
    #[error("Operation '{name}' acts on {num_qubits} qubits; unroll it before re-layout")]
    MultiQubitOperation { name: String, num_qubits: usize },

    /// A layout does not describe a placement of the circuit.
    #[error("Invalid layout {layout:?}: {reason}")]
    InvalidLayout { layout: Vec<u32>, reason: String },

    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qtt_ir::IrError),

    /// Error reading the backend description or calibration.
    #[error("Backend error: {0}")]
    Hal(#[from] qtt_hal::HalError),
}

/// Result type for re-layout operations.
pub type RemapResult<T> = Result<T, RemapError>;
