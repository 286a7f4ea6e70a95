//! Static backend configuration.
//!
//! A [`BackendConfiguration`] describes what never changes between
//! calibrations: qubit count, native gates, connectivity and the timing
//! grid the control electronics impose.

use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Static description of a backend.
///
/// Coupling edges are bidirectional: `(a, b)` allows two-qubit gates in
/// both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfiguration {
    /// Name of the backend.
    pub backend_name: String,
    /// Number of physical qubits.
    pub n_qubits: u32,
    /// Native gate names (OpenQASM naming, lowercase).
    pub basis_gates: Vec<String>,
    /// Coupling edges between physical qubits.
    #[serde(default)]
    pub coupling_map: Vec<(u32, u32)>,
    /// Whether the backend is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Sample time in seconds. All durations are integer multiples of it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,
    /// Pulse timing grid, absent on backends without pulse-level control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing_constraints: Option<TimingConstraints>,
}

/// Timing grid imposed by the control electronics, in units of `dt`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConstraints {
    /// Every pulse length must be a multiple of this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<u32>,
    /// Minimum pulse length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    /// Every gate must start at a multiple of this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse_alignment: Option<u32>,
    /// Every measurement must start at a multiple of this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire_alignment: Option<u32>,
}

impl TimingConstraints {
    /// The constraints of a typical superconducting device.
    pub fn superconducting() -> Self {
        Self {
            granularity: Some(16),
            min_length: Some(64),
            pulse_alignment: Some(16),
            acquire_alignment: Some(16),
        }
    }
}

impl BackendConfiguration {
    /// Create a configuration with no coupling edges and no timing model.
    pub fn new(
        name: impl Into<String>,
        n_qubits: u32,
        basis_gates: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            backend_name: name.into(),
            n_qubits,
            basis_gates: basis_gates.into_iter().map(Into::into).collect(),
            coupling_map: vec![],
            simulator: false,
            dt: None,
            timing_constraints: None,
        }
    }

    /// Set the coupling edges.
    #[must_use]
    pub fn with_coupling_map(mut self, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        self.coupling_map = edges.into_iter().collect();
        self
    }

    /// Set the sample time and timing grid.
    #[must_use]
    pub fn with_timing(mut self, dt: f64, constraints: TimingConstraints) -> Self {
        self.dt = Some(dt);
        self.timing_constraints = Some(constraints);
        self
    }

    /// Mark the backend as a simulator.
    #[must_use]
    pub fn as_simulator(mut self) -> Self {
        self.simulator = true;
        self
    }

    /// Whether a gate name is native on this backend.
    pub fn supports(&self, gate: &str) -> bool {
        self.basis_gates.iter().any(|g| g == gate)
    }

    /// The pulse alignment in `dt`.
    ///
    /// Fails when the backend publishes no timing constraints or the
    /// constraints lack the key.
    pub fn pulse_alignment(&self) -> HalResult<u32> {
        self.timing_constraints
            .and_then(|tc| tc.pulse_alignment)
            .ok_or_else(|| HalError::MissingTimingConstraint {
                backend: self.backend_name.clone(),
                key: "pulse_alignment",
            })
    }

    /// Check internal consistency: edges in range, no self-loops, at least
    /// one basis gate.
    pub fn validate(&self) -> HalResult<()> {
        if self.basis_gates.is_empty() {
            return Err(HalError::Configuration(format!(
                "backend '{}' declares no basis gates",
                self.backend_name
            )));
        }
        for &(a, b) in &self.coupling_map {
            if a == b || a >= self.n_qubits || b >= self.n_qubits {
                return Err(HalError::Configuration(format!(
                    "backend '{}' has invalid coupling edge ({a}, {b}) for {} qubits",
                    self.backend_name, self.n_qubits
                )));
            }
        }
        if let Some(alignment) = self.timing_constraints.and_then(|tc| tc.pulse_alignment) {
            if alignment == 0 {
                return Err(HalError::Configuration(format!(
                    "backend '{}' has a zero pulse alignment",
                    self.backend_name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_alignment_present() {
        let config = BackendConfiguration::new("dev", 2, ["rz", "sx", "x", "cx"])
            .with_timing(2.2e-10, TimingConstraints::superconducting());
        assert_eq!(config.pulse_alignment().unwrap(), 16);
    }

    #[test]
    fn test_pulse_alignment_missing_block() {
        let config = BackendConfiguration::new("dev", 2, ["rz", "sx", "x", "cx"]);
        let err = config.pulse_alignment().unwrap_err();
        assert!(matches!(
            err,
            HalError::MissingTimingConstraint {
                key: "pulse_alignment",
                ..
            }
        ));
    }

    #[test]
    fn test_pulse_alignment_missing_key() {
        let constraints = TimingConstraints {
            pulse_alignment: None,
            ..TimingConstraints::superconducting()
        };
        let config =
            BackendConfiguration::new("dev", 2, ["rz", "cx"]).with_timing(1e-9, constraints);
        assert!(config.pulse_alignment().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_edge() {
        let config = BackendConfiguration::new("dev", 2, ["cx"]).with_coupling_map([(0, 2)]);
        assert!(matches!(
            config.validate(),
            Err(HalError::Configuration(_))
        ));

        let ok = BackendConfiguration::new("dev", 3, ["cx"]).with_coupling_map([(0, 2)]);
        ok.validate().unwrap();
    }

    #[test]
    fn test_yaml_form() {
        let yaml = r"
backend_name: tiny
n_qubits: 2
basis_gates: [rz, sx, x, cx]
coupling_map: [[0, 1]]
dt: 2.2e-10
timing_constraints:
  pulse_alignment: 8
";
        let config: BackendConfiguration = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.coupling_map, vec![(0, 1)]);
        assert!(config.supports("sx"));
        assert_eq!(config.pulse_alignment().unwrap(), 8);
    }
}
