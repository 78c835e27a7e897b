//! Runtime configuration for the sync layer
//!
//! All fields use `#[serde(default)]` so a partial JSON file only overrides
//! what it names.

use crate::sync::DiffOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Treat category wrappers as transparent when diffing
    pub skip_category_group: bool,

    /// Leaf count above which popularity ranking moves to the worker thread
    pub popular_offload_threshold: usize,

    /// Request paths that carry the session credential
    pub protected_prefixes: Vec<String>,

    /// Request paths that never carry it, checked first
    pub public_prefixes: Vec<String>,

    /// Link target used when a wiki-link image cannot be signed
    pub asset_placeholder: String,

    /// Export folder prefix stripped from image object keys
    pub figure_prefix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            skip_category_group: true,
            popular_offload_threshold: 2000,
            protected_prefixes: vec!["/admin".to_string(), "/content".to_string()],
            public_prefixes: vec!["/auth".to_string()],
            asset_placeholder: "#".to_string(),
            figure_prefix: "-1_figures/".to_string(),
        }
    }
}

impl SyncConfig {
    /// Load and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: SyncConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.popular_offload_threshold == 0 {
            return Err(ConfigError::Invalid(
                "popularOffloadThreshold must be greater than 0".to_string(),
            ));
        }

        for prefix in self.protected_prefixes.iter().chain(&self.public_prefixes) {
            if !prefix.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "path prefix must start with '/': {:?}",
                    prefix
                )));
            }
        }

        if self.asset_placeholder.is_empty() {
            return Err(ConfigError::Invalid(
                "assetPlaceholder cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            skip_category_group: self.skip_category_group,
        }
    }
}
