//! Layout passes for mapping logical qubits to physical qubits.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;
use tracing::debug;

use qtt_ir::CircuitDag;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{CouplingMap, Layout, PropertySet};

fn check_fits(dag: &CircuitDag, coupling_map: &CouplingMap) -> CompileResult<()> {
    if dag.num_qubits() > coupling_map.num_qubits() as usize {
        return Err(CompileError::CircuitTooLarge {
            required: dag.num_qubits(),
            available: coupling_map.num_qubits(),
        });
    }
    Ok(())
}

/// A random generator seeded from `seed`, or from the OS when unseeded.
pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Trivial layout pass.
///
/// Maps logical qubit i to physical qubit i.
pub struct TrivialLayout;

impl Pass for TrivialLayout {
    fn name(&self) -> &'static str {
        "TrivialLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        check_fits(dag, coupling_map)?;

        let mut layout = Layout::new();
        for (physical, logical) in (0u32..).zip(dag.qubits()) {
            layout.add(logical, physical);
        }
        properties.layout = Some(layout);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}

/// Pins logical qubit i to `physical[i]`.
#[derive(Debug, Clone)]
pub struct SetLayout {
    physical: Vec<u32>,
}

impl SetLayout {
    /// Create a pass that applies the given mapping.
    pub fn new(physical: Vec<u32>) -> Self {
        Self { physical }
    }
}

impl Pass for SetLayout {
    fn name(&self) -> &'static str {
        "SetLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        check_fits(dag, coupling_map)?;

        let qubits = dag.qubits();
        if self.physical.len() != qubits.len() {
            return Err(CompileError::InvalidLayout(format!(
                "{} entries for a {}-qubit circuit",
                self.physical.len(),
                qubits.len()
            )));
        }

        let mut seen = FxHashSet::default();
        let mut layout = Layout::new();
        for (&logical, &physical) in qubits.iter().zip(&self.physical) {
            if physical >= coupling_map.num_qubits() {
                return Err(CompileError::InvalidLayout(format!(
                    "physical qubit {physical} does not exist on a {}-qubit device",
                    coupling_map.num_qubits()
                )));
            }
            if !seen.insert(physical) {
                return Err(CompileError::InvalidLayout(format!(
                    "physical qubit {physical} is used twice"
                )));
            }
            layout.add(logical, physical);
        }

        properties.layout = Some(layout);
        Ok(())
    }
}

/// Dense layout pass.
///
/// Grows a connected region of the device from a random start qubit,
/// always adding the candidate with the most links into the region (ties
/// broken at random). The busiest logical qubits, by two-qubit gate count,
/// are placed on the best-connected qubits of the region.
#[derive(Debug, Clone, Default)]
pub struct DenseLayout {
    seed: Option<u64>,
}

impl DenseLayout {
    /// Create a dense layout pass. `None` draws fresh entropy on each run.
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    fn grow_region<R: Rng>(coupling_map: &CouplingMap, size: usize, rng: &mut R) -> Vec<u32> {
        let n = coupling_map.num_qubits();
        let mut region = vec![rng.gen_range(0..n)];
        let mut in_region = FxHashSet::from_iter(region.iter().copied());

        while region.len() < size {
            let links = |q: u32| {
                coupling_map
                    .neighbors(q)
                    .iter()
                    .filter(|nb| in_region.contains(nb))
                    .count()
            };
            let mut candidates: Vec<u32> = (0..n)
                .filter(|q| !in_region.contains(q) && links(*q) > 0)
                .collect();
            // A disconnected device: jump to any free qubit.
            if candidates.is_empty() {
                candidates = (0..n).filter(|q| !in_region.contains(q)).collect();
            }

            let best = candidates.iter().map(|&q| links(q)).max().unwrap_or(0);
            candidates.retain(|&q| links(q) == best);
            let Some(&next) = candidates.choose(rng) else {
                break;
            };
            region.push(next);
            in_region.insert(next);
        }
        region
    }
}

impl Pass for DenseLayout {
    fn name(&self) -> &'static str {
        "DenseLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        check_fits(dag, coupling_map)?;

        let qubits = dag.qubits();
        if qubits.is_empty() {
            properties.layout = Some(Layout::new());
            return Ok(());
        }

        let mut rng = seeded_rng(self.seed);
        let region = Self::grow_region(coupling_map, qubits.len(), &mut rng);

        // (two-qubit gate count, position in `qubits`)
        let mut activity: Vec<(usize, usize)> = (0..qubits.len()).map(|i| (0, i)).collect();
        for (_, inst) in dag.topological_ops() {
            if inst.is_gate() && inst.qubits.len() >= 2 {
                for q in &inst.qubits {
                    if let Ok(pos) = qubits.binary_search(q) {
                        activity[pos].0 += 1;
                    }
                }
            }
        }
        activity.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let in_region: FxHashSet<u32> = region.iter().copied().collect();
        let mut ranked = region.clone();
        ranked.sort_by_key(|&p| {
            std::cmp::Reverse(
                coupling_map
                    .neighbors(p)
                    .iter()
                    .filter(|nb| in_region.contains(nb))
                    .count(),
            )
        });

        let mut layout = Layout::new();
        for ((_, logical_pos), &physical) in activity.iter().zip(&ranked) {
            layout.add(qubits[*logical_pos], physical);
        }
        debug!("Dense layout region: {:?}", region);

        properties.layout = Some(layout);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}
