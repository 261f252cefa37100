//! Storage configuration and path management for name-guard.
//!
//! All file locations are decided here so tests can inject a temp root via
//! [`StorageConfig::with_root`].

use std::path::{Path, PathBuf};

/// Central configuration for all name-guard storage paths.
///
/// Production code uses `StorageConfig::default()` which points to `~/.name-guard/`.
/// Tests use `StorageConfig::with_root(temp_dir)` for isolation.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            root: home.join(".name-guard"),
        }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to markers.json (file-backed marker store).
    pub fn markers_file(&self) -> PathBuf {
        self.root.join("markers.json")
    }

    /// Path to properties.json (file-backed per-project properties).
    pub fn properties_file(&self) -> PathBuf {
        self.root.join("properties.json")
    }

    /// Path to config.json (engine settings).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Path to messages.json (optional message overrides).
    pub fn messages_file(&self) -> PathBuf {
        self.root.join("messages.json")
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Directories
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to logs/ directory (rolling log files).
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the root directory and standard subdirectories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs_err::create_dir_all(&self.root)?;
        fs_err::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
