//! Error types for the transpilation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running the pipeline.
///
/// Apart from the checks made before any work starts, every variant wraps
/// the collaborator error unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// Fewer seeds than transpilation attempts.
    #[error("seed_transpiler has {provided} entries but num_transpilations is {required}")]
    SeedListTooShort { required: usize, provided: usize },

    /// An option is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An options file could not be parsed.
    #[error("Failed to parse options: {0}")]
    Parse(String),

    /// An options file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Error from the transpiler or scheduling passes.
    #[error("Compile error: {0}")]
    Compile(#[from] qtt_compile::CompileError),

    /// Error from noise-aware re-layout.
    #[error("Remap error: {0}")]
    Remap(#[from] qtt_remap::RemapError),

    /// Error reading the backend description.
    #[error("Backend error: {0}")]
    Hal(#[from] qtt_hal::HalError),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
