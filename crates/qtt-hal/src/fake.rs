//! Built-in fake devices.
//!
//! Snapshots of small superconducting devices with synthetic but
//! deterministic calibration data, for tests and offline use.

use crate::backend::GenericBackend;
use crate::configuration::{BackendConfiguration, TimingConstraints};
use crate::error::{HalError, HalResult};
use crate::properties::{BackendProperties, GateProperties, QubitProperties};

/// Names accepted by [`builtin`].
pub const BUILTIN_BACKENDS: &[&str] = &["fake_lagos", "fake_manila", "simulator"];

/// Sample time of the fake devices, in seconds.
const FAKE_DT: f64 = 2.222_222_222_222_222e-10;

/// Native gates of the fake superconducting devices.
const IBM_BASIS: [&str; 5] = ["cx", "id", "rz", "sx", "x"];

/// Look up a built-in backend by name.
pub fn builtin(name: &str) -> HalResult<GenericBackend> {
    match name {
        "fake_lagos" => Ok(fake_lagos()),
        "fake_manila" => Ok(fake_manila()),
        "simulator" => Ok(simulator(16)),
        _ => Err(HalError::UnknownBackend {
            name: name.to_string(),
            available: BUILTIN_BACKENDS.join(", "),
        }),
    }
}

/// 7-qubit device with an H-shaped coupling graph.
///
/// ```text
/// 0 - 1 - 2
///     |
///     3
///     |
/// 4 - 5 - 6
/// ```
pub fn fake_lagos() -> GenericBackend {
    fake_device(
        "fake_lagos",
        7,
        &[(0, 1), (1, 2), (1, 3), (3, 5), (4, 5), (5, 6)],
    )
}

/// 5-qubit device with a linear coupling graph.
pub fn fake_manila() -> GenericBackend {
    fake_device("fake_manila", 5, &[(0, 1), (1, 2), (2, 3), (3, 4)])
}

/// Noiseless all-to-all simulator with a universal basis and no timing
/// model.
pub fn simulator(num_qubits: u32) -> GenericBackend {
    let mut edges = vec![];
    for i in 0..num_qubits {
        for j in (i + 1)..num_qubits {
            edges.push((i, j));
        }
    }
    let config = BackendConfiguration::new(
        "simulator",
        num_qubits,
        [
            "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz",
            "p", "u", "cx", "cy", "cz", "swap", "ccx", "cswap",
        ],
    )
    .with_coupling_map(edges)
    .as_simulator();
    GenericBackend::new(config, None)
}

fn fake_device(name: &str, n_qubits: u32, edges: &[(u32, u32)]) -> GenericBackend {
    let config = BackendConfiguration::new(name, n_qubits, IBM_BASIS)
        .with_coupling_map(edges.iter().copied())
        .with_timing(FAKE_DT, TimingConstraints::superconducting());

    let qubits = (0..n_qubits)
        .map(|q| QubitProperties {
            t1: Some(1.0e-4 + 1.5e-5 * f64::from(q % 3)),
            t2: Some(7.0e-5 + 1.0e-5 * f64::from((q * 2) % 5)),
            readout_error: Some(0.015 + 0.005 * f64::from((q * 5) % 4)),
            readout_length: Some(5600),
        })
        .collect();

    let mut gates = vec![];
    for q in 0..n_qubits {
        let sq_error = 2.0e-4 + 5.0e-5 * f64::from((q * 7) % 5);
        for gate in ["id", "sx", "x"] {
            gates.push(GateProperties {
                gate: gate.into(),
                qubits: vec![q],
                gate_error: Some(sq_error),
                gate_length: Some(160),
            });
        }
        gates.push(GateProperties {
            gate: "rz".into(),
            qubits: vec![q],
            gate_error: Some(0.0),
            gate_length: Some(0),
        });
        gates.push(GateProperties {
            gate: "reset".into(),
            qubits: vec![q],
            gate_error: None,
            gate_length: Some(1280),
        });
    }
    for &(a, b) in edges {
        let cx_error = 6.0e-3 + 1.5e-3 * f64::from((a * 3 + b * 5) % 7);
        let cx_length = 16 * (100 + 8 * u64::from((a + b) % 5));
        for qubits in [vec![a, b], vec![b, a]] {
            gates.push(GateProperties {
                gate: "cx".into(),
                qubits,
                gate_error: Some(cx_error),
                gate_length: Some(cx_length),
            });
        }
    }

    GenericBackend::new(config, Some(BackendProperties::new(qubits, gates)))
}
