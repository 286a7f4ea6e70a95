//! Error types for the HAL crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// No built-in backend with this name.
    #[error("Unknown backend '{name}' (available: {available})")]
    UnknownBackend {
        /// The requested name.
        name: String,
        /// Comma-separated list of known names.
        available: String,
    },

    /// The backend configuration has no timing constraint with this key.
    #[error("Backend '{backend}' has no timing constraint '{key}'")]
    MissingTimingConstraint {
        /// Backend name.
        backend: String,
        /// The missing key, e.g. `pulse_alignment`.
        key: &'static str,
    },

    /// The backend reports no calibration properties.
    #[error("Backend '{0}' has no calibration properties")]
    MissingProperties(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Reading a backend description failed.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
