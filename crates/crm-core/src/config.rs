//! Application configuration loaded from TOML.
//!
//! Every field has a default, so an empty document (or no file at all) is a
//! valid configuration:
//!
//! ```toml
//! [storage]
//! backend = "file"
//! dir = ".crm"
//!
//! [presets]
//! path = "presets.toml"
//! seed = true
//!
//! [log]
//! filter = "warn"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crm_contracts::{CrmError, CrmResult};

/// File name probed in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "crm.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub presets: PresetsConfig,
    pub log: LogConfig,
}

/// Which storage adapter backs the role and subject catalogs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    /// One JSON file per key under `dir`.
    #[default]
    File,
    /// Process-local map; nothing survives exit.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            dir: PathBuf::from(".crm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetsConfig {
    /// Preset file; the built-in presets are used when absent.
    pub path: Option<PathBuf>,
    /// Insert missing system roles into storage on startup.
    pub seed: bool,
}

impl Default for PresetsConfig {
    fn default() -> Self {
        Self { path: None, seed: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: "warn".to_string() }
    }
}

impl AppConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `CrmError::ConfigError` when the document is malformed or has
    /// fields of the wrong type.
    pub fn from_toml_str(s: &str) -> CrmResult<Self> {
        toml::from_str(s).map_err(|e| CrmError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> CrmResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CrmError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Resolve the configuration for a binary.
    ///
    /// An explicit path must exist. Without one, `crm.toml` in the working
    /// directory is used if present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> CrmResult<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            debug!(path = %fallback.display(), "loading config from working directory");
            return Self::from_file(fallback);
        }
        Ok(Self::default())
    }
}
