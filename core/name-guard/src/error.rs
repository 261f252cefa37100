//! Error types for name-guard operations.

use std::path::PathBuf;

use crate::types::ProjectId;

/// All errors that can occur in name-guard operations.
///
/// Storage failures never escape a pipeline step: the engine logs them and
/// moves on to the next project. They are surfaced as values here so hosts
/// and backends share one vocabulary.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    // ─────────────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Storage error: {context}: {details}")]
    Storage { context: String, details: String },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported store version {found} in {path} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Resource Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Project no longer exists: {0}")]
    StaleResource(ProjectId),

    // ─────────────────────────────────────────────────────────────────────
    // Host Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Workspace refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Configuration write failed: {path}: {source}")]
    ConfigWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GuardError {
    pub fn storage(context: impl Into<String>, details: impl Into<String>) -> Self {
        GuardError::Storage {
            context: context.into(),
            details: details.into(),
        }
    }

    /// True for marker- and property-store failures.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            GuardError::Storage { .. }
                | GuardError::Io { .. }
                | GuardError::Json { .. }
                | GuardError::UnsupportedVersion { .. }
        )
    }
}

/// Convenience type alias for Results using GuardError.
pub type Result<T> = std::result::Result<T, GuardError>;
