//! One-call transpilation against a backend.

use serde::{Deserialize, Serialize};
use tracing::info;

use qtt_hal::Backend;
use qtt_ir::Circuit;

use crate::error::CompileResult;
use crate::manager::PassManagerBuilder;

/// Options for a single [`transpile`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileOptions {
    /// Optimization level, clamped to 0..=3.
    pub optimization_level: u8,
    /// Seed for the randomized layout and routing passes.
    pub seed: Option<u64>,
    /// Pinned physical qubit for each logical qubit.
    pub initial_layout: Option<Vec<u32>>,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            optimization_level: 1,
            seed: None,
            initial_layout: None,
        }
    }
}

impl TranspileOptions {
    /// Default options with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Transpile `circuit` for `backend`.
///
/// The result acts on the backend's physical qubits, uses only its basis
/// gates (plus measure, reset, barrier and delay) and respects its coupling
/// map. It keeps the input circuit's name. With a seed the result is
/// deterministic.
pub fn transpile(
    circuit: &Circuit,
    backend: &dyn Backend,
    options: &TranspileOptions,
) -> CompileResult<Circuit> {
    info!(
        "Transpiling '{}' for {} (level {}, seed {:?})",
        circuit.name(),
        backend.name(),
        options.optimization_level,
        options.seed
    );

    let (pm, mut properties) = PassManagerBuilder::new()
        .with_optimization_level(options.optimization_level)
        .with_seed(options.seed)
        .with_initial_layout(options.initial_layout.clone())
        .with_backend(backend)
        .build();

    let mut dag = circuit.dag().clone();
    pm.run(&mut dag, &mut properties)?;

    Ok(Circuit::from_dag(dag).with_name(circuit.name()))
}
