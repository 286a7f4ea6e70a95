//! Target-specific compilation passes.
//!
//! These passes require target hardware properties from the `PropertySet`
//! (coupling map, basis gates, layout) and produce circuits the device can
//! run.

pub mod layout;
pub mod routing;
pub mod translation;

pub use layout::{DenseLayout, SetLayout, TrivialLayout};
pub use routing::StochasticRouting;
pub use translation::BasisTranslation;
