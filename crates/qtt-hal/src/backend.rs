//! Backend trait and a data-driven implementation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::configuration::BackendConfiguration;
use crate::error::{HalError, HalResult};
use crate::properties::BackendProperties;

/// A compilation target.
///
/// Only the descriptive side of a device is modelled: the transpiler reads
/// the configuration and calibration, it never submits jobs.
pub trait Backend: Send + Sync {
    /// Name of the backend.
    fn name(&self) -> &str;

    /// Static configuration.
    fn configuration(&self) -> &BackendConfiguration;

    /// Latest calibration, if the backend publishes one.
    fn properties(&self) -> Option<&BackendProperties>;

    /// Number of physical qubits.
    fn num_qubits(&self) -> u32 {
        self.configuration().n_qubits
    }
}

/// A backend described entirely by data.
///
/// Used for the built-in fake devices and for devices loaded from a JSON or
/// YAML snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericBackend {
    /// Static configuration.
    pub configuration: BackendConfiguration,
    /// Calibration snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BackendProperties>,
}

impl GenericBackend {
    /// Create a backend from its parts.
    pub fn new(configuration: BackendConfiguration, properties: Option<BackendProperties>) -> Self {
        Self {
            configuration,
            properties,
        }
    }

    /// Parse and validate a JSON snapshot.
    pub fn from_json(json: &str) -> HalResult<Self> {
        let backend: Self = serde_json::from_str(json)?;
        backend.configuration.validate()?;
        Ok(backend)
    }

    /// Parse and validate a YAML snapshot.
    pub fn from_yaml(yaml: &str) -> HalResult<Self> {
        let backend: Self = serde_yaml_ng::from_str(yaml)?;
        backend.configuration.validate()?;
        Ok(backend)
    }

    /// Load a snapshot file; `.yaml`/`.yml` are read as YAML, anything else
    /// as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> HalResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| HalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loading backend description from {}", path.display());

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> HalResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Backend for GenericBackend {
    fn name(&self) -> &str {
        &self.configuration.backend_name
    }

    fn configuration(&self) -> &BackendConfiguration {
        &self.configuration
    }

    fn properties(&self) -> Option<&BackendProperties> {
        self.properties.as_ref()
    }
}
