//! Serializable pipeline options.
//!
//! Options can be written in YAML or JSON; missing keys take their defaults:
//!
//! ```yaml
//! optimization_level: 1
//! num_transpilations: 5
//! seed_transpiler: [11, 12, null, 14, 15]
//! apply_mapomatic: true
//! apply_dd: false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// Highest optimization level the transpiler knows.
pub const MAX_OPTIMIZATION_LEVEL: u8 = 3;

fn default_optimization_level() -> u8 {
    0
}

fn default_num_transpilations() -> usize {
    1
}

/// Options of a [`TranspilationPipeline`](crate::TranspilationPipeline) that
/// can live in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranspilationOptions {
    /// Optimization level passed to every transpilation, 0 to 3.
    #[serde(default = "default_optimization_level")]
    pub optimization_level: u8,

    /// Transpilation attempts per circuit; the cheapest is kept.
    #[serde(default = "default_num_transpilations")]
    pub num_transpilations: usize,

    /// Seed of each attempt. `None` entries, or no list at all, leave the
    /// attempt unseeded. Must have at least `num_transpilations` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_transpiler: Option<Vec<Option<u64>>>,

    /// Re-lay the chosen circuit out onto the lowest-error qubits.
    #[serde(default)]
    pub apply_mapomatic: bool,

    /// Pad idle windows with an X-X decoupling sequence.
    #[serde(default)]
    pub apply_dd: bool,
}

impl Default for TranspilationOptions {
    fn default() -> Self {
        Self {
            optimization_level: default_optimization_level(),
            num_transpilations: default_num_transpilations(),
            seed_transpiler: None,
            apply_mapomatic: false,
            apply_dd: false,
        }
    }
}

impl TranspilationOptions {
    /// Parse options from YAML.
    pub fn from_yaml(yaml: &str) -> PipelineResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| PipelineError::Parse(e.to_string()))
    }

    /// Parse options from JSON.
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        serde_json::from_str(json).map_err(|e| PipelineError::Parse(e.to_string()))
    }

    /// Load options from a file, as JSON when the extension is `.json` and
    /// as YAML otherwise, and validate them.
    pub fn from_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let options = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };
        options.validate()?;

        debug!("Loaded transpilation options from {}", path.display());
        Ok(options)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> PipelineResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| PipelineError::Parse(e.to_string()))
    }

    /// Check that every option is in range. The seed list is checked by
    /// [`seeds`](Self::seeds).
    pub fn validate(&self) -> PipelineResult<()> {
        if self.optimization_level > MAX_OPTIMIZATION_LEVEL {
            return Err(PipelineError::InvalidConfiguration(format!(
                "optimization_level must be between 0 and {MAX_OPTIMIZATION_LEVEL}, got {}",
                self.optimization_level
            )));
        }
        if self.num_transpilations == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "num_transpilations must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The seed of every attempt, in order.
    ///
    /// Without a seed list every attempt is unseeded; a list shorter than
    /// `num_transpilations` fails with [`PipelineError::SeedListTooShort`].
    /// Extra seeds are ignored.
    pub fn seeds(&self) -> PipelineResult<Vec<Option<u64>>> {
        let required = self.num_transpilations;
        match &self.seed_transpiler {
            None => Ok(vec![None; required]),
            Some(seeds) if seeds.len() < required => Err(PipelineError::SeedListTooShort {
                required,
                provided: seeds.len(),
            }),
            Some(seeds) => Ok(seeds[..required].to_vec()),
        }
    }
}
