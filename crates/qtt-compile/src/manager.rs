//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use qtt_hal::Backend;
use qtt_ir::CircuitDag;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{
    BasisTranslation, CancelCX, DenseLayout, FixedPoint, MergeRz, SetLayout, StochasticRouting,
    TrivialLayout, UnrollMultiQubit,
};
use crate::property::{BasisGates, CouplingMap, PropertySet};

/// Upper bound on rounds of the level-3 optimization loop.
const MAX_OPTIMIZATION_ROUNDS: usize = 10;

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            dag.depth(),
            dag.num_ops()
        );

        Ok(())
    }

    /// Names of the passes, in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating pass managers with preset configurations.
pub struct PassManagerBuilder {
    /// Optimization level (0-3).
    optimization_level: u8,
    /// Seed for the randomized layout and routing passes.
    seed: Option<u64>,
    /// Pinned physical qubit for each logical qubit.
    initial_layout: Option<Vec<u32>>,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            optimization_level: 1,
            seed: None,
            initial_layout: None,
            properties: PropertySet::new(),
        }
    }

    /// Set the optimization level.
    ///
    /// - Level 0: Trivial layout, routing and translation only
    /// - Level 1: Dense layout and CX cancellation (default)
    /// - Level 2: + RZ merging
    /// - Level 3: Optimization passes repeated to a fixed point
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(3);
        self
    }

    /// Seed the randomized passes. Without a seed every build draws fresh
    /// entropy.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Pin logical qubit i to physical qubit `layout[i]`.
    #[must_use]
    pub fn with_initial_layout(mut self, layout: Option<Vec<u32>>) -> Self {
        self.initial_layout = layout;
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Target a backend. A backend without coupling edges is treated as
    /// fully connected.
    #[must_use]
    pub fn with_backend(self, backend: &dyn Backend) -> Self {
        let config = backend.configuration();
        let coupling_map = if config.coupling_map.is_empty() {
            CouplingMap::full(config.n_qubits)
        } else {
            CouplingMap::from_backend(config)
        };
        self.with_target(coupling_map, BasisGates::from_backend(config))
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        pm.add_pass(UnrollMultiQubit);

        if self.properties.coupling_map.is_some() {
            match (self.initial_layout, self.optimization_level) {
                (Some(layout), _) => pm.add_pass(SetLayout::new(layout)),
                (None, 0) => pm.add_pass(TrivialLayout),
                (None, _) => pm.add_pass(DenseLayout::new(self.seed)),
            }
            pm.add_pass(StochasticRouting::new(self.seed));
        }

        if self.properties.basis_gates.is_some() {
            pm.add_pass(BasisTranslation);
        }

        if self.optimization_level >= 1 {
            pm.add_pass(CancelCX);
        }
        if self.optimization_level >= 2 {
            pm.add_pass(MergeRz);
        }
        if self.optimization_level >= 3 {
            pm.add_pass(FixedPoint::new(
                vec![Box::new(CancelCX), Box::new(MergeRz)],
                MAX_OPTIMIZATION_ROUNDS,
            ));
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
