//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qtt_ir::IrError),

    /// Error reading the backend description.
    #[error("Backend error: {0}")]
    Hal(#[from] qtt_hal::HalError),

    /// Missing coupling map for routing.
    #[error("Missing coupling map for routing")]
    MissingCouplingMap,

    /// Missing layout for routing.
    #[error("Missing layout for routing")]
    MissingLayout,

    /// Missing basis gates.
    #[error("Missing basis gates for translation")]
    MissingBasisGates,

    /// Routing failed because qubits are not connected.
    #[error("Routing failed: qubits {qubit1} and {qubit2} not connected")]
    RoutingFailed { qubit1: u32, qubit2: u32 },

    /// Gate not in target basis.
    #[error("Gate '{0}' not in target basis")]
    GateNotInBasis(String),

    /// A pinned initial layout does not fit the circuit or device.
    #[error("Invalid initial layout: {0}")]
    InvalidLayout(String),

    /// Invalid pass configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),

    /// Circuit too large for target.
    #[error("Circuit requires {required} qubits but target only has {available}")]
    CircuitTooLarge { required: usize, available: u32 },

    /// No duration is known for an instruction.
    #[error("No duration for '{name}' on qubits {qubits:?}")]
    MissingDuration { name: String, qubits: Vec<u32> },

    /// Padding was requested before the circuit was scheduled.
    #[error("Circuit has not been scheduled; run ALAPScheduleAnalysis first")]
    MissingSchedule,

    /// An idle interval or sequence gate violates the pulse alignment.
    #[error("Interval of {length} dt on qubit {qubit} is not a multiple of the pulse alignment {alignment}")]
    AlignmentViolation {
        qubit: u32,
        length: u64,
        alignment: u32,
    },
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
