//! Repeated-seed transpilation with optional re-layout and decoupling.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use qtt_compile::{TranspileOptions, transpile};
use qtt_hal::{Backend, HalError};
use qtt_ir::Circuit;
use qtt_remap::{
    LayoutCost, MAX_LAYOUTS, RemapError, compare_costs, deflate_circuit, evaluate_layouts,
    matching_layouts_limited,
};

use crate::config::TranspilationOptions;
use crate::cost::{TranspileCost, transpile_cost_depth_cnot};
use crate::dd::{DecouplingPlan, DecouplingPlanBuilder};
use crate::error::PipelineResult;

/// One circuit or an ordered batch.
///
/// [`TranspilationPipeline::transpile`] returns the same variant it is
/// given. Deserializes from a single circuit object or an array of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Circuits {
    /// A single circuit.
    Single(Circuit),
    /// An ordered batch of circuits.
    Batch(Vec<Circuit>),
}

impl Circuits {
    /// Number of circuits.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(circuits) => circuits.len(),
        }
    }

    /// True for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The circuits as a slice, in order.
    pub fn as_slice(&self) -> &[Circuit] {
        match self {
            Self::Single(circuit) => std::slice::from_ref(circuit),
            Self::Batch(circuits) => circuits,
        }
    }

    /// Iterate over the circuits in order.
    pub fn iter(&self) -> impl Iterator<Item = &Circuit> {
        self.as_slice().iter()
    }

    /// Consume into a vector, in order.
    pub fn into_vec(self) -> Vec<Circuit> {
        match self {
            Self::Single(circuit) => vec![circuit],
            Self::Batch(circuits) => circuits,
        }
    }

    /// Rebuild `circuits` in the shape of `self`.
    fn same_shape(&self, mut circuits: Vec<Circuit>) -> Self {
        match (self, circuits.pop()) {
            (Self::Single(_), Some(circuit)) if circuits.is_empty() => Self::Single(circuit),
            (_, last) => {
                circuits.extend(last);
                Self::Batch(circuits)
            }
        }
    }
}

impl From<Circuit> for Circuits {
    fn from(circuit: Circuit) -> Self {
        Self::Single(circuit)
    }
}

impl From<Vec<Circuit>> for Circuits {
    fn from(circuits: Vec<Circuit>) -> Self {
        Self::Batch(circuits)
    }
}

/// Transpiles circuits for one backend, keeping the cheapest of several
/// seeded attempts.
///
/// Per call, every circuit goes through:
///
/// 1. `num_transpilations` transpilations, one per seed; the first attempt
///    with the lowest `cost_transpile` wins.
/// 2. With `apply_mapomatic`, after step 1 finished for the whole batch:
///    deflate, find up to [`MAX_LAYOUTS`] SWAP-free layouts, score them
///    with `cost_mapomatic` and transpile the deflated circuit again pinned
///    to the best one.
/// 3. With `apply_dd`, the decoupling plan. Without a supplied plan one is
///    built from the backend at the start of every call and shared by the
///    whole batch.
///
/// Any error aborts the call; there are no partial results.
///
/// ```rust
/// use std::sync::Arc;
///
/// use qtt::{Circuits, TranspilationPipeline};
/// use qtt_hal::fake;
/// use qtt_ir::Circuit;
///
/// let pipeline = TranspilationPipeline::builder(Arc::new(fake::fake_lagos()))
///     .with_num_transpilations(4)
///     .with_seeds([1, 2, 3, 4])
///     .build();
///
/// let out = pipeline.transpile(&Circuits::from(Circuit::ghz(3).unwrap())).unwrap();
/// assert!(matches!(out, Circuits::Single(_)));
/// ```
pub struct TranspilationPipeline {
    backend: Arc<dyn Backend>,
    options: TranspilationOptions,
    cost_transpile: Arc<TranspileCost>,
    cost_mapomatic: Option<Arc<LayoutCost>>,
    dd_plan: Option<DecouplingPlan>,
}

impl TranspilationPipeline {
    /// A pipeline with default options: one unseeded level-0 transpilation,
    /// no re-layout and no decoupling.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::builder(backend).build()
    }

    /// A pipeline with the given options and default cost functions.
    pub fn with_options(backend: Arc<dyn Backend>, options: TranspilationOptions) -> Self {
        Self::builder(backend).with_options(options).build()
    }

    /// Start building a pipeline.
    pub fn builder(backend: Arc<dyn Backend>) -> TranspilationPipelineBuilder {
        TranspilationPipelineBuilder::new(backend)
    }

    /// The target backend.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Replace the target backend. A supplied decoupling plan is kept as is.
    pub fn set_backend(&mut self, backend: Arc<dyn Backend>) {
        self.backend = backend;
    }

    /// The serializable options.
    pub fn options(&self) -> &TranspilationOptions {
        &self.options
    }

    /// Transpile one circuit or a batch; the result has the same shape.
    #[instrument(skip_all, fields(num_circuits = circuits.len()))]
    pub fn transpile(&self, circuits: &Circuits) -> PipelineResult<Circuits> {
        let out = self.run(circuits.as_slice())?;
        Ok(circuits.same_shape(out))
    }

    /// Transpile a single circuit.
    pub fn transpile_circuit(&self, circuit: &Circuit) -> PipelineResult<Circuit> {
        self.with_plan(1, |seeds, plan| {
            let mut out = self.select_best(circuit, seeds)?;
            if self.options.apply_mapomatic {
                out = self.remap(&out)?;
            }
            match plan {
                Some(plan) => plan.run(&out),
                None => Ok(out),
            }
        })
    }

    /// Transpile a batch, preserving order.
    pub fn transpile_batch(&self, circuits: &[Circuit]) -> PipelineResult<Vec<Circuit>> {
        self.run(circuits)
    }

    fn run(&self, circuits: &[Circuit]) -> PipelineResult<Vec<Circuit>> {
        self.with_plan(circuits.len(), |seeds, plan| {
            let mut out = circuits
                .iter()
                .map(|circuit| self.select_best(circuit, seeds))
                .collect::<PipelineResult<Vec<_>>>()?;

            if self.options.apply_mapomatic {
                out = out
                    .iter()
                    .map(|circuit| self.remap(circuit))
                    .collect::<PipelineResult<Vec<_>>>()?;
            }

            if let Some(plan) = plan {
                out = out
                    .iter()
                    .map(|circuit| plan.run(circuit))
                    .collect::<PipelineResult<Vec<_>>>()?;
            }

            Ok(out)
        })
    }

    /// Check the options, build the decoupling plan if one is needed, and
    /// hand both to `stages`.
    fn with_plan<T>(
        &self,
        num_circuits: usize,
        stages: impl FnOnce(&[Option<u64>], Option<&DecouplingPlan>) -> PipelineResult<T>,
    ) -> PipelineResult<T> {
        let seeds = self.options.seeds()?;
        self.options.validate()?;

        let built;
        let dd_plan = match (&self.dd_plan, self.options.apply_dd) {
            (_, false) => None,
            (Some(plan), true) => Some(plan),
            (None, true) => {
                built = DecouplingPlanBuilder::new(Arc::clone(&self.backend)).get_plan()?;
                Some(&built)
            }
        };

        info!(
            "Transpiling {} circuit(s) for '{}' ({} attempts each, level {})",
            num_circuits,
            self.backend.name(),
            seeds.len(),
            self.options.optimization_level
        );

        stages(&seeds, dd_plan)
    }

    /// Transpile once per seed and keep the first cheapest result.
    fn select_best(&self, circuit: &Circuit, seeds: &[Option<u64>]) -> PipelineResult<Circuit> {
        debug_assert!(!seeds.is_empty());
        let mut seeds = seeds.iter().copied();

        let mut best = self.attempt(circuit, 0, seeds.next().flatten())?;
        for (attempt, seed) in seeds.enumerate() {
            let candidate = self.attempt(circuit, attempt + 1, seed)?;
            if compare_costs(candidate.1, best.1) == Ordering::Less {
                best = candidate;
            }
        }

        let (circuit, cost) = best;
        debug!("Selected '{}' with cost {cost}", circuit.name());
        Ok(circuit)
    }

    /// One seeded transpilation and its cost.
    fn attempt(
        &self,
        circuit: &Circuit,
        attempt: usize,
        seed: Option<u64>,
    ) -> PipelineResult<(Circuit, f64)> {
        let options = TranspileOptions {
            optimization_level: self.options.optimization_level,
            seed,
            initial_layout: None,
        };
        let candidate = transpile(circuit, self.backend.as_ref(), &options)?;
        let cost = (self.cost_transpile)(&candidate);
        debug!("Attempt {attempt} (seed {seed:?}) of '{}': cost {cost}", circuit.name());
        Ok((candidate, cost))
    }

    /// Move a transpiled circuit onto its lowest-cost matching layout.
    fn remap(&self, circuit: &Circuit) -> PipelineResult<Circuit> {
        let backend = self.backend.as_ref();
        if self.cost_mapomatic.is_none() && backend.properties().is_none() {
            return Err(HalError::MissingProperties(backend.name().to_string()).into());
        }

        let small = deflate_circuit(circuit)?;
        let layouts = matching_layouts_limited(&small, backend, MAX_LAYOUTS)?;
        let scores = evaluate_layouts(&small, &layouts, backend, self.cost_mapomatic.as_deref())?;

        let Some((layout, score)) = scores.into_iter().next() else {
            return Err(RemapError::NoMatchingLayout {
                backend: backend.name().to_string(),
                num_qubits: small.num_qubits(),
            }
            .into());
        };
        debug!("Re-laying out '{}' onto {layout:?} (cost {score})", circuit.name());

        let options = TranspileOptions {
            initial_layout: Some(layout),
            ..TranspileOptions::default()
        };
        Ok(transpile(&small, backend, &options)?)
    }
}

impl fmt::Debug for TranspilationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranspilationPipeline")
            .field("backend", &self.backend.name())
            .field("options", &self.options)
            .field("custom_layout_cost", &self.cost_mapomatic.is_some())
            .field("dd_plan", &self.dd_plan)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TranspilationPipeline`].
pub struct TranspilationPipelineBuilder {
    backend: Arc<dyn Backend>,
    options: TranspilationOptions,
    cost_transpile: Option<Arc<TranspileCost>>,
    cost_mapomatic: Option<Arc<LayoutCost>>,
    dd_plan: Option<DecouplingPlan>,
}

impl TranspilationPipelineBuilder {
    /// Start from the default options.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            options: TranspilationOptions::default(),
            cost_transpile: None,
            cost_mapomatic: None,
            dd_plan: None,
        }
    }

    /// Replace all serializable options at once.
    #[must_use]
    pub fn with_options(mut self, options: TranspilationOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the optimization level (0-3).
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.options.optimization_level = level;
        self
    }

    /// Set the number of attempts per circuit.
    #[must_use]
    pub fn with_num_transpilations(mut self, num: usize) -> Self {
        self.options.num_transpilations = num;
        self
    }

    /// Set the seed of each attempt; `None` entries stay unseeded.
    #[must_use]
    pub fn with_seed_transpiler(mut self, seeds: Vec<Option<u64>>) -> Self {
        self.options.seed_transpiler = Some(seeds);
        self
    }

    /// Seed every attempt.
    #[must_use]
    pub fn with_seeds(self, seeds: impl IntoIterator<Item = u64>) -> Self {
        self.with_seed_transpiler(seeds.into_iter().map(Some).collect())
    }

    /// Score attempts with `cost` instead of
    /// [`transpile_cost_depth_cnot`].
    #[must_use]
    pub fn with_cost_transpile(
        mut self,
        cost: impl Fn(&Circuit) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.cost_transpile = Some(Arc::new(cost));
        self
    }

    /// Enable or disable noise-aware re-layout.
    #[must_use]
    pub fn with_mapomatic(mut self, apply: bool) -> Self {
        self.options.apply_mapomatic = apply;
        self
    }

    /// Score layouts with `cost` instead of the calibration-based default.
    #[must_use]
    pub fn with_cost_mapomatic(
        mut self,
        cost: impl Fn(&Circuit, &[u32], &dyn Backend) -> qtt_remap::RemapResult<f64>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.cost_mapomatic = Some(Arc::new(cost));
        self
    }

    /// Enable or disable dynamical decoupling.
    #[must_use]
    pub fn with_dd(mut self, apply: bool) -> Self {
        self.options.apply_dd = apply;
        self
    }

    /// Use `plan` instead of building one from the backend.
    #[must_use]
    pub fn with_dd_plan(mut self, plan: DecouplingPlan) -> Self {
        self.dd_plan = Some(plan);
        self
    }

    /// Build the pipeline. Options are checked when it runs.
    pub fn build(self) -> TranspilationPipeline {
        TranspilationPipeline {
            backend: self.backend,
            options: self.options,
            cost_transpile: self
                .cost_transpile
                .unwrap_or_else(|| Arc::new(transpile_cost_depth_cnot)),
            cost_mapomatic: self.cost_mapomatic,
            dd_plan: self.dd_plan,
        }
    }
}
