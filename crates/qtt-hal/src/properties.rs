//! Calibration data reported by a backend.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Per-qubit calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitProperties {
    /// Relaxation time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t1: Option<f64>,
    /// Dephasing time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t2: Option<f64>,
    /// Probability of reading out the wrong state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readout_error: Option<f64>,
    /// Measurement duration in `dt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readout_length: Option<u64>,
}

/// Calibration of one gate on one tuple of physical qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateProperties {
    /// Gate name.
    pub gate: String,
    /// Physical qubits, in operand order.
    pub qubits: Vec<u32>,
    /// Error probability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_error: Option<f64>,
    /// Duration in `dt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_length: Option<u64>,
}

/// Calibration snapshot of a backend.
///
/// Two-qubit entries are looked up in operand order first and then
/// reversed, so a device that only reports `cx` on `(0, 1)` still answers
/// for `(1, 0)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "PropertiesData", into = "PropertiesData")]
pub struct BackendProperties {
    qubits: Vec<QubitProperties>,
    gates: Vec<GateProperties>,
    index: FxHashMap<(String, Vec<u32>), usize>,
}

#[derive(Serialize, Deserialize)]
struct PropertiesData {
    #[serde(default)]
    qubits: Vec<QubitProperties>,
    #[serde(default)]
    gates: Vec<GateProperties>,
}

impl From<PropertiesData> for BackendProperties {
    fn from(data: PropertiesData) -> Self {
        Self::new(data.qubits, data.gates)
    }
}

impl From<BackendProperties> for PropertiesData {
    fn from(props: BackendProperties) -> Self {
        Self {
            qubits: props.qubits,
            gates: props.gates,
        }
    }
}

impl BackendProperties {
    /// Build a snapshot. Later duplicates of a `(gate, qubits)` entry win.
    pub fn new(qubits: Vec<QubitProperties>, gates: Vec<GateProperties>) -> Self {
        let index = gates
            .iter()
            .enumerate()
            .map(|(i, g)| ((g.gate.clone(), g.qubits.clone()), i))
            .collect();
        Self {
            qubits,
            gates,
            index,
        }
    }

    /// Per-qubit calibration entries, indexed by physical qubit.
    pub fn qubits(&self) -> &[QubitProperties] {
        &self.qubits
    }

    /// All gate calibration entries.
    pub fn gates(&self) -> &[GateProperties] {
        &self.gates
    }

    /// Calibration of `gate` on `qubits`.
    pub fn gate(&self, gate: &str, qubits: &[u32]) -> Option<&GateProperties> {
        let key = (gate.to_string(), qubits.to_vec());
        if let Some(&i) = self.index.get(&key) {
            return Some(&self.gates[i]);
        }
        if qubits.len() == 2 {
            let reversed = (gate.to_string(), vec![qubits[1], qubits[0]]);
            return self.index.get(&reversed).map(|&i| &self.gates[i]);
        }
        None
    }

    /// Error probability of `gate` on `qubits`.
    pub fn gate_error(&self, gate: &str, qubits: &[u32]) -> Option<f64> {
        self.gate(gate, qubits).and_then(|g| g.gate_error)
    }

    /// Duration of `gate` on `qubits`, in `dt`.
    pub fn gate_length(&self, gate: &str, qubits: &[u32]) -> Option<u64> {
        self.gate(gate, qubits).and_then(|g| g.gate_length)
    }

    /// Readout error of a physical qubit.
    pub fn readout_error(&self, qubit: u32) -> Option<f64> {
        self.qubits
            .get(qubit as usize)
            .and_then(|q| q.readout_error)
    }

    /// Readout duration of a physical qubit, in `dt`.
    pub fn readout_length(&self, qubit: u32) -> Option<u64> {
        self.qubits
            .get(qubit as usize)
            .and_then(|q| q.readout_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BackendProperties {
        BackendProperties::new(
            vec![
                QubitProperties {
                    t1: Some(1e-4),
                    t2: Some(8e-5),
                    readout_error: Some(0.02),
                    readout_length: Some(4000),
                },
                QubitProperties {
                    t1: None,
                    t2: None,
                    readout_error: None,
                    readout_length: None,
                },
            ],
            vec![
                GateProperties {
                    gate: "sx".into(),
                    qubits: vec![0],
                    gate_error: Some(3e-4),
                    gate_length: Some(160),
                },
                GateProperties {
                    gate: "cx".into(),
                    qubits: vec![0, 1],
                    gate_error: Some(1e-2),
                    gate_length: Some(1600),
                },
            ],
        )
    }

    #[test]
    fn test_gate_lookup() {
        let props = sample();
        assert_eq!(props.gate_length("sx", &[0]), Some(160));
        assert_eq!(props.gate_error("sx", &[1]), None);
        assert_eq!(props.gate_error("cx", &[0, 1]), Some(1e-2));
    }

    #[test]
    fn test_reversed_two_qubit_lookup() {
        let props = sample();
        assert_eq!(props.gate_length("cx", &[1, 0]), Some(1600));
    }

    #[test]
    fn test_readout() {
        let props = sample();
        assert_eq!(props.readout_error(0), Some(0.02));
        assert_eq!(props.readout_length(0), Some(4000));
        assert_eq!(props.readout_error(1), None);
        assert_eq!(props.readout_error(7), None);
    }

    #[test]
    fn test_serde_rebuilds_index() {
        let json = serde_json::to_string(&sample()).unwrap();
        let back: BackendProperties = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gate_length("cx", &[0, 1]), Some(1600));
        assert_eq!(back.qubits().len(), 2);
    }
}
