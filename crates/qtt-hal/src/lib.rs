//! qtt Hardware Abstraction Layer
//!
//! Describes the devices the transpiler targets. A [`Backend`] exposes a
//! static [`BackendConfiguration`] (qubit count, basis gates, coupling map,
//! timing constraints) and an optional [`BackendProperties`] calibration
//! snapshot (gate errors and lengths, readout errors and lengths).
//!
//! # Example
//!
//! ```rust
//! use qtt_hal::{Backend, fake};
//!
//! let backend = fake::fake_lagos();
//! assert_eq!(backend.num_qubits(), 7);
//! assert_eq!(backend.configuration().pulse_alignment().unwrap(), 16);
//!
//! let props = backend.properties().unwrap();
//! assert!(props.gate_error("cx", &[0, 1]).is_some());
//! ```
//!
//! Devices can also be described in JSON or YAML and loaded with
//! [`GenericBackend::from_file`].

pub mod backend;
pub mod configuration;
pub mod error;
pub mod fake;
pub mod properties;

pub use backend::{Backend, GenericBackend};
pub use configuration::{BackendConfiguration, TimingConstraints};
pub use error::{HalError, HalResult};
pub use properties::{BackendProperties, GateProperties, QubitProperties};
