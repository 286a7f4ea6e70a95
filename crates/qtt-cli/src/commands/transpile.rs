//! Transpile command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qtt::{TranspilationOptions, TranspilationPipeline, transpile_cost_depth_cnot};
use qtt_hal::Backend;

use super::common::{load_backend, load_circuits, save_circuits};

/// Arguments of `qtt transpile`.
#[derive(Debug, Default)]
pub struct Request {
    pub input: String,
    pub backend: String,
    pub config: Option<String>,
    pub optimization_level: Option<u8>,
    pub num_transpilations: Option<usize>,
    pub seeds: Vec<u64>,
    pub mapomatic: bool,
    pub dd: bool,
    pub output: Option<String>,
}

impl Request {
    /// Options from the config file, if any, with command-line flags on top.
    pub fn options(&self) -> Result<TranspilationOptions> {
        let mut options = match &self.config {
            Some(path) => TranspilationOptions::from_file(path)
                .with_context(|| format!("Failed to load options from {path}"))?,
            None => TranspilationOptions::default(),
        };

        if let Some(level) = self.optimization_level {
            options.optimization_level = level;
        }
        if let Some(num) = self.num_transpilations {
            options.num_transpilations = num;
        }
        if !self.seeds.is_empty() {
            options.seed_transpiler = Some(self.seeds.iter().copied().map(Some).collect());
        }
        options.apply_mapomatic |= self.mapomatic;
        options.apply_dd |= self.dd;

        Ok(options)
    }
}

/// Execute the transpile command.
pub fn execute(request: &Request) -> Result<()> {
    let options = request.options()?;
    let backend = load_backend(&request.backend)?;
    let circuits = load_circuits(&request.input)?;

    eprintln!(
        "{} Transpiling {} circuit(s) from {} for {}",
        style("→").cyan().bold(),
        circuits.len(),
        style(&request.input).green(),
        style(backend.name()).yellow()
    );
    eprintln!(
        "  Level {}, {} attempt(s){}{}",
        options.optimization_level,
        options.num_transpilations,
        if options.apply_mapomatic {
            ", mapomatic"
        } else {
            ""
        },
        if options.apply_dd { ", DD" } else { "" }
    );

    let pipeline = TranspilationPipeline::with_options(Arc::new(backend), options);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid progress template")?,
    );
    spinner.set_message("Transpiling...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = pipeline.transpile(&circuits);
    spinner.finish_and_clear();
    let transpiled = result?;

    eprintln!("{} Transpilation complete", style("✓").green().bold());
    for circuit in transpiled.iter() {
        eprintln!(
            "  {}: depth {}, {} cx, cost {}",
            style(circuit.name()).bold(),
            circuit.depth(),
            circuit.count_ops().get("cx").copied().unwrap_or(0),
            transpile_cost_depth_cnot(circuit)
        );
    }

    save_circuits(&transpiled, request.output.as_deref())?;
    if let Some(path) = &request.output {
        eprintln!("  Output: {}", style(path).green());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.yaml");
        std::fs::write(
            &path,
            "optimization_level: 1\nnum_transpilations: 2\nseed_transpiler: [7, 8]\napply_dd: true\n",
        )
        .unwrap();

        let request = Request {
            config: Some(path.to_string_lossy().into_owned()),
            optimization_level: Some(3),
            mapomatic: true,
            ..Request::default()
        };
        let options = request.options().unwrap();
        assert_eq!(options.optimization_level, 3);
        assert_eq!(options.num_transpilations, 2);
        assert_eq!(options.seed_transpiler, Some(vec![Some(7), Some(8)]));
        assert!(options.apply_mapomatic);
        assert!(options.apply_dd);
    }

    #[test]
    fn test_seed_flags_replace_file_seeds() {
        let request = Request {
            num_transpilations: Some(2),
            seeds: vec![4, 5],
            ..Request::default()
        };
        let options = request.options().unwrap();
        assert_eq!(options.seeds().unwrap(), vec![Some(4), Some(5)]);
    }

    #[test]
    fn test_no_config_gives_defaults() {
        let options = Request::default().options().unwrap();
        assert_eq!(options, TranspilationOptions::default());
    }
}
