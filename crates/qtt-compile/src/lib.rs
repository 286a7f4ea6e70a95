//! qtt Compilation and Transpilation Framework
//!
//! This crate turns logical circuits into circuits a specific backend can
//! run. It implements a pass-based architecture: every step is a [`Pass`]
//! over a [`CircuitDag`](qtt_ir::CircuitDag), sharing results through a
//! [`PropertySet`].
//!
//! # Overview
//!
//! 1. **Unrolling**: Break three-qubit gates into one- and two-qubit gates
//! 2. **Layout**: Map logical qubits to physical qubits on the target device
//! 3. **Routing**: Insert SWAP gates to satisfy connectivity constraints
//! 4. **Translation**: Convert gates to the target's native gate set
//! 5. **Optimization**: Cancel CX pairs and merge RZ rotations
//!
//! Scheduling passes work on the result: [`scheduling::ALAPScheduleAnalysis`]
//! assigns start times and [`scheduling::PadDynamicalDecoupling`] fills idle
//! windows with an echo sequence.
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       |
//!       v
//! +-------------+
//! | PassManager | <-- PropertySet (coupling map, basis gates, layout)
//! +-------------+
//!       |
//!       |-- UnrollMultiQubit
//!       |-- TrivialLayout / DenseLayout / SetLayout
//!       |-- StochasticRouting
//!       |-- BasisTranslation
//!       `-- CancelCX / MergeRz / FixedPoint
//!       |
//!       v
//! Output Circuit (physical qubits, native gates)
//! ```
//!
//! # Example: Transpile for a backend
//!
//! ```rust
//! use qtt_compile::{TranspileOptions, transpile};
//! use qtt_hal::fake;
//! use qtt_ir::Circuit;
//!
//! let circuit = Circuit::ghz(4).unwrap();
//! let backend = fake::fake_lagos();
//!
//! let out = transpile(&circuit, &backend, &TranspileOptions::seeded(42)).unwrap();
//! assert_eq!(out.num_qubits(), 7);
//! assert!(out.count_ops().contains_key("cx"));
//! ```
//!
//! # Example: Driving the pass manager directly
//!
//! ```rust
//! use qtt_compile::{BasisGates, CouplingMap, PassManagerBuilder};
//! use qtt_ir::Circuit;
//!
//! let circuit = Circuit::bell().unwrap();
//!
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_optimization_level(2)
//!     .with_seed(Some(7))
//!     .with_target(CouplingMap::linear(5), BasisGates::ibm())
//!     .build();
//!
//! let mut dag = circuit.into_dag();
//! pm.run(&mut dag, &mut props).unwrap();
//! assert!(props.final_layout.is_some());
//! ```
//!
//! # Optimization Levels
//!
//! | Level | Passes Included |
//! |-------|-----------------|
//! | 0 | Trivial layout + routing + translation |
//! | 1 | Dense layout, + CX cancellation |
//! | 2 | + RZ merging |
//! | 3 | + cancellation and merging repeated to a fixed point |
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to create custom compilation passes:
//!
//! ```rust
//! use qtt_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use qtt_ir::CircuitDag;
//!
//! struct CountOps;
//!
//! impl Pass for CountOps {
//!     fn name(&self) -> &str { "count_ops" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(dag.num_ops());
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod property;
pub mod scheduling;
pub mod transpile;

// Built-in passes
pub mod passes;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use property::{BasisGates, CouplingMap, Layout, PropertySet};
pub use scheduling::{
    ALAPScheduleAnalysis, InstructionDurations, PadDynamicalDecoupling, Schedule,
};
pub use transpile::{TranspileOptions, transpile};
