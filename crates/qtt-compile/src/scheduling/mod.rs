//! Timing-aware passes.
//!
//! [`ALAPScheduleAnalysis`] assigns every operation of a physical circuit a
//! start time from the backend's instruction durations;
//! [`PadDynamicalDecoupling`] then fills the idle windows of that schedule.

pub mod alap;
pub mod dd;
pub mod durations;

pub use alap::{ALAPScheduleAnalysis, Schedule};
pub use dd::PadDynamicalDecoupling;
pub use durations::InstructionDurations;
