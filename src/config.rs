//! Optional TOML configuration.
//!
//! Everything has a sensible default; a `clonemap.toml` in the working
//! directory (or an explicit `--config` path) overrides it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "clonemap.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where saved reports land.
    pub results_dir: PathBuf,
    /// Upper bound of the distance-threshold sweep.
    pub max_distance_threshold: usize,
    /// Default seed for k-means initialization.
    pub kmeans_seed: u64,
    pub kmeans_max_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            results_dir: PathBuf::from("results"),
            max_distance_threshold: 15,
            kmeans_seed: 0,
            kmeans_max_iterations: 300,
        }
    }
}

impl Config {
    /// Load an explicit config file, or `clonemap.toml` if one exists in
    /// the working directory, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        match explicit {
            Some(path) => Config::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Config::from_file(default_path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_missing_keys() {
        let config: Config = toml::from_str("max_distance_threshold = 20").unwrap();
        assert_eq!(config.max_distance_threshold, 20);
        assert_eq!(config.results_dir, PathBuf::from("results"));
        assert_eq!(config.kmeans_seed, 0);
    }
}
