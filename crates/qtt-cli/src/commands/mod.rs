//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod cost;
pub mod transpile;
pub mod version;
