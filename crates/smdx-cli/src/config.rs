//! Configuration loading for both tools
//!
//! `smdx2model` reads `[convert]` and `smdx-manifest` reads `[manifest]` from
//! the same file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use smdx_core::{ConvertOptions, ManifestConfig, UnknownTypePolicy, DEFAULT_MODEL_NAME};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub convert: ConvertConfig,
    #[serde(default)]
    pub manifest: ManifestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// SMDX document to read (the `--smdx` flag takes precedence)
    #[serde(default)]
    pub input: Option<PathBuf>,
    /// Where to write the layout
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Name after `data` in the layout header
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// `reject` or `zero`
    #[serde(default)]
    pub unknown_types: UnknownTypePolicy,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: default_output(),
            model_name: default_model_name(),
            unknown_types: UnknownTypePolicy::default(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("output.model")
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

impl ConvertConfig {
    pub fn to_options(&self) -> ConvertOptions {
        ConvertOptions {
            model_name: self.model_name.clone(),
            unknown_types: self.unknown_types,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
