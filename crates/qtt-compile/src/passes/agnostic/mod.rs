//! Target-agnostic compilation passes.
//!
//! These passes operate on the DAG structure alone. `UnrollMultiQubit`
//! consults the basis gates when present but works without them.

pub mod optimization;
pub mod unroll;

pub use optimization::{CancelCX, FixedPoint, MergeRz};
pub use unroll::UnrollMultiQubit;
