//! qtt: best-of-N transpilation for noisy devices
//!
//! A thin orchestration layer over the qtt transpiler. A
//! [`TranspilationPipeline`] transpiles each circuit several times with
//! different seeds and keeps the cheapest result, then optionally moves it
//! onto the lowest-error qubits of the device and pads idle windows with
//! an X-X dynamical decoupling sequence.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use qtt::{Circuits, TranspilationOptions, TranspilationPipeline};
//! use qtt_hal::fake;
//! use qtt_ir::Circuit;
//!
//! let options = TranspilationOptions::from_yaml(
//!     "
//! optimization_level: 1
//! num_transpilations: 3
//! seed_transpiler: [7, 8, 9]
//! apply_mapomatic: true
//! apply_dd: true
//! ",
//! )
//! .unwrap();
//!
//! let pipeline = TranspilationPipeline::with_options(Arc::new(fake::fake_lagos()), options);
//! let batch = vec![Circuit::bell().unwrap(), Circuit::ghz(3).unwrap()];
//! let out = pipeline.transpile(&Circuits::from(batch)).unwrap();
//! assert_eq!(out.len(), 2);
//! ```
//!
//! # Cost functions
//!
//! Attempts are ranked by [`transpile_cost_depth_cnot`] (`depth + 20 * cx`)
//! unless another function is given to
//! [`TranspilationPipelineBuilder::with_cost_transpile`]. Layouts are
//! ranked by the calibration-based [`qtt_remap::default_cost`] unless one is
//! given to [`TranspilationPipelineBuilder::with_cost_mapomatic`].

pub mod config;
pub mod cost;
pub mod dd;
pub mod error;
pub mod pipeline;

pub use config::TranspilationOptions;
pub use cost::{DepthCnotCost, TranspileCost, transpile_cost_depth_cnot};
pub use dd::{DD_SEQUENCE, DecouplingPlan, DecouplingPlanBuilder};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{Circuits, TranspilationPipeline, TranspilationPipelineBuilder};
