use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Minimal modularity gain between two passes of the local-move phase.
pub(crate) const PRECISION :f64 = 0.000001;

/// Seed of the node visiting order, shared by every layer.
pub(crate) const SHUFFLE_SEED :u64 = 0;

/// Layer cap used when the caller gives none.
pub const DEFAULT_MAX_LAYERS :usize = 9999;

/// Detector settings, loadable from a YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_layers: usize, // Maximal number of coarse-graining steps.
    pub seed: u64, // Seed handed to the detector and to synthetic graphs.
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            max_layers: DEFAULT_MAX_LAYERS,
            seed: 0,
        }
    }
}

impl DetectorConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Invalid detector config")
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
    }
}
