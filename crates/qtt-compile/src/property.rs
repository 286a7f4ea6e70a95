//! `PropertySet` and the target description types passes share.
//!
//! Passes communicate through a [`PropertySet`]: layout passes write the
//! initial [`Layout`], routing reads it together with the [`CouplingMap`]
//! and records the final layout, translation reads the [`BasisGates`].
//! Scheduling passes store their results as typed custom properties.
//!
//! # Examples
//!
//! ```
//! use qtt_compile::{BasisGates, CouplingMap, PropertySet};
//!
//! let props = PropertySet::new().with_target(CouplingMap::linear(5), BasisGates::ibm());
//!
//! let cm = props.coupling_map.as_ref().unwrap();
//! assert!(cm.is_connected(0, 1));
//! assert_eq!(cm.distance(0, 4), Some(4));
//! ```
//!
//! Custom properties are keyed by type:
//!
//! ```
//! use qtt_compile::PropertySet;
//!
//! #[derive(Debug, PartialEq)]
//! struct SwapCount(usize);
//!
//! let mut props = PropertySet::new();
//! props.insert(SwapCount(3));
//! assert_eq!(props.get::<SwapCount>(), Some(&SwapCount(3)));
//! ```

use std::any::{Any, TypeId};
use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use qtt_hal::BackendConfiguration;
use qtt_ir::QubitId;

/// A mapping from logical qubits to physical qubits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    logical_to_physical: FxHashMap<QubitId, u32>,
    physical_to_logical: FxHashMap<u32, QubitId>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical qubit i on physical qubit i.
    pub fn trivial(num_qubits: u32) -> Self {
        Self::from_physical(&(0..num_qubits).collect::<Vec<_>>())
    }

    /// Logical qubit i on `physical[i]`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_physical(physical: &[u32]) -> Self {
        let mut layout = Self::new();
        for (i, &p) in physical.iter().enumerate() {
            layout.add(QubitId(i as u32), p);
        }
        layout
    }

    /// Map `logical` to `physical`, dropping any mapping either side had.
    pub fn add(&mut self, logical: QubitId, physical: u32) {
        if let Some(old_logical) = self.physical_to_logical.remove(&physical) {
            self.logical_to_physical.remove(&old_logical);
        }
        if let Some(old_physical) = self.logical_to_physical.remove(&logical) {
            self.physical_to_logical.remove(&old_physical);
        }
        self.logical_to_physical.insert(logical, physical);
        self.physical_to_logical.insert(physical, logical);
    }

    /// Get the physical qubit for a logical qubit.
    pub fn get_physical(&self, logical: QubitId) -> Option<u32> {
        self.logical_to_physical.get(&logical).copied()
    }

    /// Get the logical qubit for a physical qubit.
    pub fn get_logical(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_logical.get(&physical).copied()
    }

    /// Exchange whatever sits on two physical qubits.
    pub fn swap(&mut self, p1: u32, p2: u32) {
        let l1 = self.physical_to_logical.remove(&p1);
        let l2 = self.physical_to_logical.remove(&p2);

        if let Some(l1) = l1 {
            self.logical_to_physical.insert(l1, p2);
            self.physical_to_logical.insert(p2, l1);
        }
        if let Some(l2) = l2 {
            self.logical_to_physical.insert(l2, p1);
            self.physical_to_logical.insert(p1, l2);
        }
    }

    /// Get the number of mapped qubits.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// (logical, physical) pairs in logical order.
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, u32)> {
        let mut pairs: Vec<_> = self
            .logical_to_physical
            .iter()
            .map(|(&l, &p)| (l, p))
            .collect();
        pairs.sort_unstable();
        pairs.into_iter()
    }

    /// Physical qubits in logical order.
    pub fn to_physical_vec(&self) -> Vec<u32> {
        self.iter().map(|(_, p)| p).collect()
    }
}

/// Target device coupling map.
///
/// Edges are bidirectional. All-pairs distances and BFS predecessors are
/// precomputed on construction, so `distance()` is O(1) and path
/// reconstruction is O(distance).
#[derive(Debug, Clone)]
pub struct CouplingMap {
    edges: Vec<(u32, u32)>,
    num_qubits: u32,
    adjacency: Vec<Vec<u32>>,
    /// `dist[from][to]`, `u32::MAX` when unreachable.
    dist: Vec<Vec<u32>>,
    /// `pred[from][to]` is the hop before `to` on a shortest path from `from`.
    pred: Vec<Vec<u32>>,
}

impl CouplingMap {
    /// Build a coupling map from an edge list. Duplicate and reversed edges
    /// are merged; edges touching qubits `>= num_qubits` are ignored.
    pub fn from_edges(num_qubits: u32, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let n = num_qubits as usize;
        let mut adjacency = vec![Vec::new(); n];
        let mut kept = vec![];

        for (a, b) in edges {
            if a == b || a >= num_qubits || b >= num_qubits {
                continue;
            }
            if adjacency[a as usize].contains(&b) {
                continue;
            }
            adjacency[a as usize].push(b);
            adjacency[b as usize].push(a);
            kept.push((a, b));
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        let mut map = Self {
            edges: kept,
            num_qubits,
            adjacency,
            dist: vec![],
            pred: vec![],
        };
        map.precompute_distances();
        map
    }

    /// The coupling map of a backend.
    pub fn from_backend(config: &BackendConfiguration) -> Self {
        Self::from_edges(config.n_qubits, config.coupling_map.iter().copied())
    }

    /// Create a linear coupling map (0-1-2-3-...).
    pub fn linear(n: u32) -> Self {
        Self::from_edges(n, (0..n.saturating_sub(1)).map(|i| (i, i + 1)))
    }

    /// Create a fully connected coupling map.
    pub fn full(n: u32) -> Self {
        Self::from_edges(n, (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j))))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.dist = vec![vec![u32::MAX; n]; n];
        self.pred = vec![vec![u32::MAX; n]; n];

        for src in 0..n {
            self.dist[src][src] = 0;
            let mut queue = VecDeque::from([src]);
            while let Some(cur) = queue.pop_front() {
                for &nb in &self.adjacency[cur] {
                    let nb = nb as usize;
                    if self.dist[src][nb] == u32::MAX {
                        self.dist[src][nb] = self.dist[src][cur] + 1;
                        self.pred[src][nb] = cur as u32;
                        queue.push_back(nb);
                    }
                }
            }
        }
    }

    /// Check if two qubits are directly connected.
    #[inline]
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.adjacency
            .get(q1 as usize)
            .is_some_and(|neighbors| neighbors.contains(&q2))
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the coupling edges.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Neighbors of a qubit, ascending.
    pub fn neighbors(&self, qubit: u32) -> &[u32] {
        self.adjacency
            .get(qubit as usize)
            .map_or(&[], Vec::as_slice)
    }

    /// Shortest-path distance, `None` when unreachable or out of range.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        let d = *self.dist.get(from as usize)?.get(to as usize)?;
        (d != u32::MAX).then_some(d)
    }

    /// One shortest path from `from` to `to`, both ends included.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        self.distance(from, to)?;
        let row = &self.pred[from as usize];
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            current = row[current as usize];
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// A shortest path chosen uniformly at each hop among the neighbors
    /// that get one step closer to `to`.
    pub fn random_shortest_path<R: Rng + ?Sized>(
        &self,
        from: u32,
        to: u32,
        rng: &mut R,
    ) -> Option<Vec<u32>> {
        let mut remaining = self.distance(from, to)?;
        let mut path = vec![from];
        let mut current = from;
        while remaining > 0 {
            let closer: Vec<u32> = self
                .neighbors(current)
                .iter()
                .copied()
                .filter(|&nb| self.distance(nb, to) == Some(remaining - 1))
                .collect();
            current = *closer.choose(rng)?;
            path.push(current);
            remaining -= 1;
        }
        Some(path)
    }

    /// Whether every qubit can reach every other.
    pub fn is_fully_connected(&self) -> bool {
        self.dist.iter().flatten().all(|&d| d != u32::MAX)
    }
}

/// Basis gates for the target device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasisGates {
    gates: Vec<String>,
}

impl BasisGates {
    /// Create a new basis gates set.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// The native gates of a backend.
    pub fn from_backend(config: &BackendConfiguration) -> Self {
        Self::new(config.basis_gates.iter().cloned())
    }

    /// Check if a gate is in the basis.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    /// Get the basis gates.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// Superconducting basis (RZ + SX + X + CX).
    pub fn ibm() -> Self {
        Self::new(["cx", "id", "rz", "sx", "x"])
    }

    /// Every standard gate.
    pub fn universal() -> Self {
        Self::new([
            "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz", "p",
            "u", "cx", "cy", "cz", "swap", "ccx", "cswap",
        ])
    }
}

/// Properties shared between compilation passes.
///
/// | Field | Written by | Read by |
/// |-------|------------|---------|
/// | `layout` | layout passes | routing |
/// | `final_layout` | routing | callers |
/// | `coupling_map` | builder | layout, routing |
/// | `basis_gates` | builder | unrolling, translation |
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Initial logical-to-physical mapping.
    pub layout: Option<Layout>,

    /// Where each logical qubit ends up after routing.
    pub final_layout: Option<Layout>,

    /// Target coupling map defining allowed two-qubit interactions.
    pub coupling_map: Option<CouplingMap>,

    /// Target basis gates for gate decomposition.
    pub basis_gates: Option<BasisGates>,

    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.coupling_map = Some(coupling_map);
        self.basis_gates = Some(basis_gates);
        self
    }

    /// Set the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Insert a custom property, replacing any value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
