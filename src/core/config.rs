//! Optional `aidata.toml` configuration.
//!
//! Looked up from `--config`, else next to the target document. A missing file
//! means defaults; a malformed one is an error.

use crate::core::error::AidataError;
use crate::core::store::WriteMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "aidata.toml";

pub const DEFAULT_REQUIRED_METADATA_FIELDS: [&str; 3] =
    ["Schema Version", "Confidence Level", "Classification"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationConfig,
    pub write: WriteConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Run the metadata-field check against the FILE METADATA body.
    pub strict_metadata: bool,
    /// Check an existing integrity-hash line against the document.
    pub verify_integrity: bool,
    pub required_metadata_fields: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            strict_metadata: false,
            verify_integrity: true,
            required_metadata_fields: DEFAULT_REQUIRED_METADATA_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WriteConfig {
    pub atomic: bool,
}

impl WriteConfig {
    pub fn mode(&self) -> WriteMode {
        if self.atomic {
            WriteMode::Atomic
        } else {
            WriteMode::Direct
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "warn".to_string(),
        }
    }
}

pub fn parse_config(content: &str, origin: &Path) -> Result<Config, AidataError> {
    toml::from_str(content).map_err(|e| AidataError::ConfigError {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })
}

/// Resolve configuration for a command acting on `document`.
///
/// An explicit path must exist. Otherwise `aidata.toml` beside the document is
/// used when present, and defaults when not.
pub fn load_config(explicit: Option<&Path>, document: &Path) -> Result<Config, AidataError> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| AidataError::io_at(path, e))?;
        return parse_config(&content, path);
    }

    let candidate = sibling_config_path(document);
    if candidate.is_file() {
        let content =
            fs::read_to_string(&candidate).map_err(|e| AidataError::io_at(&candidate, e))?;
        return parse_config(&content, &candidate);
    }

    Ok(Config::default())
}

fn sibling_config_path(document: &Path) -> PathBuf {
    match document.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(CONFIG_FILE_NAME),
        _ => PathBuf::from(CONFIG_FILE_NAME),
    }
}
