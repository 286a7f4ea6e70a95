//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use qtt::Circuits;
use qtt_hal::{GenericBackend, fake};

/// Load one circuit or an array of circuits from a JSON file.
pub fn load_circuits(path: &str) -> Result<Circuits> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    let circuits: Circuits = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse circuits from {path}"))?;

    debug!("Loaded {} circuit(s) from {path}", circuits.len());
    Ok(circuits)
}

/// Write circuits as pretty JSON to `path`, or to stdout.
pub fn save_circuits(circuits: &Circuits, path: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(circuits).context("Failed to serialize circuits")?;
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Resolve a backend from a built-in name or a description file.
pub fn load_backend(spec: &str) -> Result<GenericBackend> {
    if fake::BUILTIN_BACKENDS.contains(&spec) {
        return Ok(fake::builtin(spec)?);
    }
    if Path::new(spec).is_file() {
        return GenericBackend::from_file(spec)
            .with_context(|| format!("Failed to load backend from {spec}"));
    }
    anyhow::bail!(
        "Unknown backend: '{spec}'. Available: {} (or a JSON/YAML description file)",
        fake::BUILTIN_BACKENDS.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtt_hal::Backend;
    use qtt_ir::Circuit;

    #[test]
    fn test_builtin_backends_resolve() {
        for name in fake::BUILTIN_BACKENDS {
            assert_eq!(load_backend(name).unwrap().name(), *name);
        }
    }

    #[test]
    fn test_unknown_backend() {
        let err = load_backend("ibm_nowhere").unwrap_err();
        assert!(err.to_string().contains("fake_lagos"));
    }

    #[test]
    fn test_backend_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manila.json");
        fs::write(&path, fake::fake_manila().to_json().unwrap()).unwrap();
        let backend = load_backend(path.to_str().unwrap()).unwrap();
        assert_eq!(backend.num_qubits(), 5);
    }

    #[test]
    fn test_circuits_keep_their_shape() {
        let dir = tempfile::tempdir().unwrap();
        let single = dir.path().join("single.json");
        let batch = dir.path().join("batch.json");

        let bell = Circuits::from(Circuit::bell().unwrap());
        save_circuits(&bell, single.to_str()).unwrap();
        assert!(matches!(
            load_circuits(single.to_str().unwrap()).unwrap(),
            Circuits::Single(_)
        ));

        let pair = Circuits::from(vec![Circuit::bell().unwrap(), Circuit::ghz(3).unwrap()]);
        save_circuits(&pair, batch.to_str()).unwrap();
        let loaded = load_circuits(batch.to_str().unwrap()).unwrap();
        assert!(matches!(loaded, Circuits::Batch(ref v) if v.len() == 2));
    }

    #[test]
    fn test_missing_input() {
        let err = load_circuits("/nonexistent/circuits.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
