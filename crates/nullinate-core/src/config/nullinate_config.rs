//! Configuration file structure

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::NullinateError;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NullinateConfig {
    /// Which discovered files to process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<FilesConfiguration>,

    /// How to run the migration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunConfiguration>,
}

/// File selection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilesConfiguration {
    /// Glob patterns, matched against paths relative to the config file
    /// directory as well as against full paths
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Leave files whose header says `<auto-generated>` untouched
    #[serde(default = "default_skip_generated")]
    pub skip_generated: bool,
}

impl Default for FilesConfiguration {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            skip_generated: default_skip_generated(),
        }
    }
}

fn default_skip_generated() -> bool {
    true
}

/// Execution settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunConfiguration {
    /// Worker threads; the rayon default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl NullinateConfig {
    /// Load configuration from file
    ///
    /// The format follows the extension: `.json`, `.toml`, `.yaml` or `.yml`.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| NullinateError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        let parsed = match ext {
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            _ => Err("unsupported file extension (expected .json, .toml, .yaml or .yml)".to_string()),
        };

        parsed.map_err(|message| {
            NullinateError::config_error(format!(
                "Failed to load config from '{}': {message}",
                path.display()
            ))
        })
    }

    /// Get files configuration with defaults
    pub fn files_config(&self) -> FilesConfiguration {
        self.files.clone().unwrap_or_default()
    }

    /// Get run configuration with defaults
    pub fn run_config(&self) -> RunConfiguration {
        self.run.clone().unwrap_or_default()
    }
}
