//! Engine settings, persisted as `config.json` in the data directory.
//!
//! A missing file yields defaults. A malformed one also yields defaults, with a
//! warning, so a hand-edited typo never disables the guard.

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tempfile::NamedTempFile;

use crate::error::{GuardError, Result};
use crate::storage::StorageConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Ask the user about mismatches found by the startup check.
    pub confirm_on_startup: bool,
    /// Trigger a workspace refresh after a cycle changed any marker.
    pub refresh_on_change: bool,
    /// Check projects that appear as `Added` in a post-build delta.
    pub validate_added_projects: bool,
    /// Default log filter when neither env override is set.
    pub log_level: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            confirm_on_startup: true,
            refresh_on_change: true,
            validate_added_projects: true,
            log_level: "info".to_string(),
        }
    }
}

/// Loads the engine configuration, returning defaults if the file doesn't exist.
pub fn load_config_with_storage(storage: &StorageConfig) -> GuardConfig {
    let path = storage.config_file();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return GuardConfig::default(),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read config; using defaults");
            return GuardConfig::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Config file malformed; using defaults"
            );
            GuardConfig::default()
        }
    }
}

/// Saves the engine configuration to disk atomically.
pub fn save_config_with_storage(storage: &StorageConfig, config: &GuardConfig) -> Result<()> {
    let path = storage.config_file();
    let write_failed = |source| GuardError::ConfigWriteFailed {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(storage.root()).map_err(write_failed)?;
    let content = serde_json::to_string_pretty(config).map_err(|e| GuardError::Json {
        context: "serialize config".to_string(),
        source: e,
    })?;

    let mut temp_file = NamedTempFile::new_in(storage.root()).map_err(write_failed)?;
    temp_file.write_all(content.as_bytes()).map_err(write_failed)?;
    temp_file.persist(&path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
