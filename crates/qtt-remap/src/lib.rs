//! Noise-aware re-layout for transpiled circuits.
//!
//! A transpiled circuit is already routed, so any relabelling of its qubits
//! that maps every two-qubit interaction onto a coupling edge is just as
//! valid. This crate finds those relabellings and ranks them by the
//! backend's calibration data:
//!
//! 1. [`deflate_circuit`] strips qubits the circuit never uses.
//! 2. [`matching_layouts`] lists every SWAP-free placement of what is left.
//! 3. [`evaluate_layouts`] scores the placements, cheapest first.
//!
//! The best layout is then fed back to the transpiler as an initial layout.
//!
//! # Example
//!
//! ```rust
//! use qtt_compile::{TranspileOptions, transpile};
//! use qtt_hal::fake;
//! use qtt_ir::Circuit;
//! use qtt_remap::{deflate_circuit, evaluate_layouts, matching_layouts};
//!
//! let backend = fake::fake_lagos();
//! let routed = transpile(&Circuit::ghz(3).unwrap(), &backend, &TranspileOptions::seeded(1)).unwrap();
//!
//! let small = deflate_circuit(&routed).unwrap();
//! let layouts = matching_layouts(&small, &backend).unwrap();
//! let scores = evaluate_layouts(&small, &layouts, &backend, None).unwrap();
//!
//! let options = TranspileOptions {
//!     initial_layout: Some(scores[0].0.clone()),
//!     ..TranspileOptions::default()
//! };
//! let best = transpile(&small, &backend, &options).unwrap();
//! assert_eq!(best.count_ops().get("measure"), Some(&3));
//! ```

pub mod deflate;
pub mod error;
pub mod evaluate;
pub mod layouts;

pub use deflate::{active_qubits, deflate_circuit};
pub use error::{RemapError, RemapResult};
pub use evaluate::{LayoutCost, compare_costs, default_cost, evaluate_layouts};
pub use layouts::{InteractionGraph, MAX_LAYOUTS, matching_layouts, matching_layouts_limited};
