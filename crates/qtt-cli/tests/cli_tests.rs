//! End-to-end tests of the `qtt` binary.

use std::fs;
use std::process::{Command, Output};

use qtt::{Circuits, transpile_cost_depth_cnot};
use qtt_ir::{Circuit, QubitId};

fn qtt(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qtt"))
        .args(args)
        .env_remove("QTT_BACKEND")
        .env_remove("QTT_CONFIG")
        .output()
        .unwrap()
}

fn two_cnots() -> Circuit {
    let mut circuit = Circuit::with_size("two_cnots", 2, 0);
    circuit.cx(QubitId(0), QubitId(1)).unwrap();
    circuit.cx(QubitId(1), QubitId(0)).unwrap();
    circuit
}

fn write_json(dir: &tempfile::TempDir, name: &str, circuits: &Circuits) -> String {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(circuits).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn version_prints_package_version() {
    let out = qtt(&["version"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn backends_lists_builtins() {
    let out = qtt(&["backends"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for name in ["fake_lagos", "fake_manila", "simulator"] {
        assert!(stdout.contains(name), "missing {name}");
    }
}

#[test]
fn cost_of_two_cnots_is_42() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_json(&dir, "two.json", &Circuits::from(two_cnots()));
    let out = qtt(&["cost", "-i", &input]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("42"));
}

#[test]
fn single_circuit_stays_single() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_json(&dir, "bell.json", &Circuits::from(Circuit::bell().unwrap()));
    let output = dir.path().join("out.json");

    let out = qtt(&[
        "transpile",
        "-i",
        &input,
        "-b",
        "fake_manila",
        "-n",
        "2",
        "--seed",
        "1",
        "--seed",
        "2",
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let result: Circuits = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let Circuits::Single(circuit) = result else {
        panic!("expected a single circuit");
    };
    assert_eq!(circuit.num_qubits(), 5);
}

#[test]
fn batch_to_stdout_with_dd() {
    let dir = tempfile::tempdir().unwrap();
    let batch = Circuits::from(vec![two_cnots(), Circuit::ghz(3).unwrap()]);
    let input = write_json(&dir, "batch.json", &batch);

    let out = qtt(&["transpile", "-i", &input, "-b", "fake_lagos", "--seed", "9", "--dd"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let result: Circuits = serde_json::from_slice(&out.stdout).unwrap();
    let Circuits::Batch(circuits) = result else {
        panic!("expected a batch");
    };
    assert_eq!(circuits.len(), 2);
    assert!(circuits.iter().all(|c| c.num_qubits() == 7));
    assert!(transpile_cost_depth_cnot(&circuits[0]) >= 40.0);
}

#[test]
fn short_seed_list_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_json(&dir, "bell.json", &Circuits::from(Circuit::bell().unwrap()));

    let out = qtt(&["transpile", "-i", &input, "-n", "3", "--seed", "1"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error:"));
}

#[test]
fn unknown_backend_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_json(&dir, "bell.json", &Circuits::from(Circuit::bell().unwrap()));

    let out = qtt(&["transpile", "-i", &input, "-b", "nowhere"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown backend"));
}
