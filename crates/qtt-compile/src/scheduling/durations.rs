//! Instruction durations read from backend calibration.

use rustc_hash::FxHashMap;

use qtt_hal::{Backend, HalError};
use qtt_ir::{Instruction, InstructionKind};

use crate::error::{CompileError, CompileResult};

/// Durations in `dt` keyed by instruction name and physical qubits.
///
/// Barriers take no time and delays carry their own duration; everything
/// else must be known. Two-qubit entries are also looked up reversed.
#[derive(Debug, Clone, Default)]
pub struct InstructionDurations {
    durations: FxHashMap<(String, Vec<u32>), u64>,
    dt: Option<f64>,
}

impl InstructionDurations {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate lengths and readout lengths from a backend's calibration.
    pub fn from_backend(backend: &dyn Backend) -> CompileResult<Self> {
        let properties = backend
            .properties()
            .ok_or_else(|| HalError::MissingProperties(backend.name().to_string()))?;

        let mut durations = Self {
            durations: FxHashMap::default(),
            dt: backend.configuration().dt,
        };
        for gate in properties.gates() {
            if let Some(length) = gate.gate_length {
                durations.insert(gate.gate.clone(), gate.qubits.clone(), length);
            }
        }
        for q in 0..backend.num_qubits() {
            if let Some(length) = properties.readout_length(q) {
                durations.insert("measure", vec![q], length);
            }
        }
        Ok(durations)
    }

    /// Set the duration of `name` on `qubits`.
    pub fn insert(&mut self, name: impl Into<String>, qubits: Vec<u32>, duration: u64) {
        self.durations.insert((name.into(), qubits), duration);
    }

    /// Sample time in seconds, if known.
    pub fn dt(&self) -> Option<f64> {
        self.dt
    }

    /// Duration of `name` on `qubits`.
    pub fn lookup(&self, name: &str, qubits: &[u32]) -> Option<u64> {
        let key = (name.to_string(), qubits.to_vec());
        if let Some(&d) = self.durations.get(&key) {
            return Some(d);
        }
        if qubits.len() == 2 {
            let reversed = (name.to_string(), vec![qubits[1], qubits[0]]);
            return self.durations.get(&reversed).copied();
        }
        None
    }

    /// Duration of a scheduled instruction.
    pub fn get(&self, inst: &Instruction) -> CompileResult<u64> {
        match inst.kind {
            InstructionKind::Barrier => Ok(0),
            InstructionKind::Delay { duration } => Ok(duration),
            _ => {
                let qubits: Vec<u32> = inst.qubits.iter().map(|q| q.0).collect();
                self.lookup(inst.name(), &qubits)
                    .ok_or_else(|| CompileError::MissingDuration {
                        name: inst.name().to_string(),
                        qubits,
                    })
            }
        }
    }
}
