//! Enumerating placements of a circuit's interaction graph on a device.
//!
//! A placement (layout) maps circuit qubit `i` to physical qubit
//! `layout[i]`. It matches when it is injective and every pair of qubits that
//! shares a two-qubit operation lands on a coupling edge, so the circuit runs
//! under it without any SWAP. This is subgraph monomorphism of the
//! interaction graph into the coupling graph; extra device edges are allowed.

use std::cmp::Reverse;
use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::debug;

use qtt_compile::CouplingMap;
use qtt_hal::Backend;
use qtt_ir::{Circuit, QubitId};

use crate::error::{RemapError, RemapResult};

/// Cap on the layouts scored for one circuit during re-layout.
///
/// An all-to-all device admits `n! / (n - k)!` placements of `k` qubits.
pub const MAX_LAYOUTS: usize = 100_000;

/// Undirected two-qubit interaction graph of a circuit.
///
/// Node `i` is the `i`-th qubit of the circuit in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionGraph {
    adjacency: Vec<Vec<usize>>,
}

impl InteractionGraph {
    /// Build the interaction graph of `circuit`.
    ///
    /// Barriers are ignored; any other operation on three or more qubits is
    /// rejected.
    pub fn from_circuit(circuit: &Circuit) -> RemapResult<Self> {
        let index = qubit_index(circuit);
        let mut adjacency = vec![Vec::new(); index.len()];

        for inst in circuit.instructions() {
            if inst.is_barrier() {
                continue;
            }
            match inst.qubits.as_slice() {
                [] | [_] => {}
                [a, b] => {
                    let (a, b) = (index[a], index[b]);
                    if !adjacency[a].contains(&b) {
                        adjacency[a].push(b);
                        adjacency[b].push(a);
                    }
                }
                qubits => {
                    return Err(RemapError::MultiQubitOperation {
                        name: inst.name().to_string(),
                        num_qubits: qubits.len(),
                    });
                }
            }
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        Ok(Self { adjacency })
    }

    /// Number of nodes.
    pub fn num_qubits(&self) -> usize {
        self.adjacency.len()
    }

    /// Interaction partners of node `qubit`, ascending.
    pub fn neighbors(&self, qubit: usize) -> &[usize] {
        self.adjacency.get(qubit).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct interacting pairs.
    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Order in which the search assigns nodes: each component breadth-first
    /// from its busiest node, busier components first.
    fn search_order(&self) -> Vec<usize> {
        let n = self.num_qubits();
        let mut roots: Vec<usize> = (0..n).collect();
        roots.sort_by_key(|&q| (Reverse(self.adjacency[q].len()), q));

        let mut seen = vec![false; n];
        let mut order = Vec::with_capacity(n);
        for root in roots {
            if seen[root] {
                continue;
            }
            seen[root] = true;
            let mut queue = VecDeque::from([root]);
            while let Some(q) = queue.pop_front() {
                order.push(q);
                for &nb in &self.adjacency[q] {
                    if !seen[nb] {
                        seen[nb] = true;
                        queue.push_back(nb);
                    }
                }
            }
        }
        order
    }
}

/// Position of every circuit qubit in ascending qubit order.
pub(crate) fn qubit_index(circuit: &Circuit) -> FxHashMap<QubitId, usize> {
    let mut qubits: Vec<QubitId> = circuit.qubits().iter().map(|q| q.id).collect();
    qubits.sort_unstable();
    qubits.into_iter().enumerate().map(|(i, q)| (q, i)).collect()
}

/// Coupling graph of a backend; a backend without edges is all-to-all.
pub(crate) fn device_coupling(backend: &dyn Backend) -> CouplingMap {
    let config = backend.configuration();
    if config.coupling_map.is_empty() {
        CouplingMap::full(config.n_qubits)
    } else {
        CouplingMap::from_backend(config)
    }
}

/// Every layout under which `circuit` runs on `backend` without SWAPs.
///
/// The result is deterministic for a given circuit and device. Fails with
/// [`RemapError::NoMatchingLayout`] when there is none.
///
/// ```rust
/// use qtt_hal::fake;
/// use qtt_ir::{Circuit, QubitId};
/// use qtt_remap::matching_layouts;
///
/// let mut circuit = Circuit::with_size("pair", 2, 0);
/// circuit.cx(QubitId(0), QubitId(1)).unwrap();
///
/// // A line of five qubits has four edges, each usable in two directions.
/// let layouts = matching_layouts(&circuit, &fake::fake_manila()).unwrap();
/// assert_eq!(layouts.len(), 8);
/// ```
pub fn matching_layouts(circuit: &Circuit, backend: &dyn Backend) -> RemapResult<Vec<Vec<u32>>> {
    matching_layouts_limited(circuit, backend, usize::MAX)
}

/// Like [`matching_layouts`], stopping after `limit` layouts.
///
/// The result is a prefix of the full, deterministic enumeration.
pub fn matching_layouts_limited(
    circuit: &Circuit,
    backend: &dyn Backend,
    limit: usize,
) -> RemapResult<Vec<Vec<u32>>> {
    let graph = InteractionGraph::from_circuit(circuit)?;
    let coupling = device_coupling(backend);
    let no_match = || RemapError::NoMatchingLayout {
        backend: backend.name().to_string(),
        num_qubits: graph.num_qubits(),
    };

    if graph.num_qubits() > coupling.num_qubits() as usize {
        return Err(no_match());
    }

    let mut search = Search {
        graph: &graph,
        coupling: &coupling,
        assignment: vec![None; graph.num_qubits()],
        used: vec![false; coupling.num_qubits() as usize],
        found: vec![],
        limit,
    };
    search.extend(&graph.search_order(), 0);

    debug!(
        "Found {} layouts for {} qubits / {} interactions on '{}'",
        search.found.len(),
        graph.num_qubits(),
        graph.num_edges(),
        backend.name()
    );

    if search.found.is_empty() {
        return Err(no_match());
    }
    Ok(search.found)
}

/// Backtracking state of the placement search.
struct Search<'a> {
    graph: &'a InteractionGraph,
    coupling: &'a CouplingMap,
    assignment: Vec<Option<u32>>,
    used: Vec<bool>,
    found: Vec<Vec<u32>>,
    limit: usize,
}

impl Search<'_> {
    fn extend(&mut self, order: &[usize], depth: usize) {
        if self.found.len() >= self.limit {
            return;
        }
        let Some(&logical) = order.get(depth) else {
            if let Some(layout) = self.assignment.iter().copied().collect::<Option<Vec<_>>>() {
                self.found.push(layout);
            }
            return;
        };

        for physical in self.candidates(logical) {
            self.assignment[logical] = Some(physical);
            self.used[physical as usize] = true;
            self.extend(order, depth + 1);
            self.used[physical as usize] = false;
            self.assignment[logical] = None;

            if self.found.len() >= self.limit {
                return;
            }
        }
    }

    /// Free physical qubits compatible with every placed neighbor of
    /// `logical`, ascending.
    fn candidates(&self, logical: usize) -> Vec<u32> {
        let degree = self.graph.neighbors(logical).len();
        let placed: Vec<u32> = self
            .graph
            .neighbors(logical)
            .iter()
            .filter_map(|&nb| self.assignment[nb])
            .collect();

        let pool: Vec<u32> = match placed.first() {
            Some(&anchor) => self.coupling.neighbors(anchor).to_vec(),
            None => (0..self.coupling.num_qubits()).collect(),
        };

        pool.into_iter()
            .filter(|&p| !self.used[p as usize])
            .filter(|&p| self.coupling.neighbors(p).len() >= degree)
            .filter(|&p| placed.iter().all(|&q| self.coupling.is_connected(p, q)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtt_hal::fake;

    fn chain(n: u32) -> Circuit {
        let mut circuit = Circuit::with_size("chain", n, 0);
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1)).unwrap();
        }
        circuit
    }

    #[test]
    fn test_interaction_graph() {
        let mut circuit = chain(3);
        circuit.cx(QubitId(1), QubitId(0)).unwrap();
        circuit.barrier_all().unwrap();
        let graph = InteractionGraph::from_circuit(&circuit).unwrap();
        assert_eq!(graph.num_qubits(), 3);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.neighbors(1), &[0, 2]);
    }

    #[test]
    fn test_three_qubit_gate_is_rejected() {
        let mut circuit = Circuit::with_size("toffoli", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let err = InteractionGraph::from_circuit(&circuit).unwrap_err();
        assert!(matches!(err, RemapError::MultiQubitOperation { num_qubits: 3, .. }));
    }

    #[test]
    fn test_search_order_starts_at_hub() {
        let mut circuit = Circuit::with_size("star", 4, 0);
        for t in [0, 1, 3] {
            circuit.cx(QubitId(2), QubitId(t)).unwrap();
        }
        let graph = InteractionGraph::from_circuit(&circuit).unwrap();
        assert_eq!(graph.search_order(), vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_chain_on_line() {
        // A 3-chain fits a 5-line in 3 positions and 2 directions.
        let layouts = matching_layouts(&chain(3), &fake::fake_manila()).unwrap();
        assert_eq!(layouts.len(), 6);
        assert!(layouts.contains(&vec![0, 1, 2]));
        assert!(layouts.contains(&vec![4, 3, 2]));
    }

    #[test]
    fn test_layouts_respect_coupling() {
        let backend = fake::fake_lagos();
        let coupling = device_coupling(&backend);
        let layouts = matching_layouts(&chain(4), &backend).unwrap();
        assert!(!layouts.is_empty());
        for layout in &layouts {
            for w in layout.windows(2) {
                assert!(coupling.is_connected(w[0], w[1]), "{layout:?}");
            }
            let mut sorted = layout.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), layout.len());
        }
    }

    #[test]
    fn test_star_does_not_fit_line() {
        let mut circuit = Circuit::with_size("star", 4, 0);
        for t in 1..4 {
            circuit.cx(QubitId(0), QubitId(t)).unwrap();
        }
        let err = matching_layouts(&circuit, &fake::fake_manila()).unwrap_err();
        assert!(matches!(err, RemapError::NoMatchingLayout { num_qubits: 4, .. }));

        // Lagos has two degree-3 hubs.
        let layouts = matching_layouts(&circuit, &fake::fake_lagos()).unwrap();
        assert!(layouts.iter().all(|l| l[0] == 1 || l[0] == 5));
    }

    #[test]
    fn test_idle_qubits_go_anywhere() {
        let circuit = Circuit::with_size("idle", 2, 0);
        let layouts = matching_layouts(&circuit, &fake::fake_manila()).unwrap();
        assert_eq!(layouts.len(), 20);
    }

    #[test]
    fn test_too_many_qubits() {
        let err = matching_layouts(&chain(6), &fake::fake_manila()).unwrap_err();
        assert!(matches!(err, RemapError::NoMatchingLayout { .. }));
    }

    #[test]
    fn test_limit_and_determinism() {
        let backend = fake::fake_lagos();
        let all = matching_layouts(&chain(3), &backend).unwrap();
        let first = matching_layouts_limited(&chain(3), &backend, 2).unwrap();
        assert_eq!(first.as_slice(), &all[..2]);
        assert_eq!(all, matching_layouts(&chain(3), &backend).unwrap());
    }

    #[test]
    fn test_limit_bounds_all_to_all_search() {
        // 14 * 13 * ... * 9 placements exist for six qubits.
        let backend = fake::simulator(14);
        let layouts = matching_layouts_limited(&chain(6), &backend, MAX_LAYOUTS).unwrap();
        assert_eq!(layouts.len(), MAX_LAYOUTS);
        assert!(layouts.iter().all(|l| {
            let mut sorted = l.clone();
            sorted.sort_unstable();
            sorted.dedup();
            sorted.len() == 6
        }));
    }

    #[test]
    fn test_simulator_is_all_to_all() {
        let backend = fake::simulator(3);
        let layouts = matching_layouts(&chain(3), &backend).unwrap();
        assert_eq!(layouts.len(), 6);
    }
}
