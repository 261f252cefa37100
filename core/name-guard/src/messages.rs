//! User-facing message bundle.
//!
//! Loaded once and never mutated afterwards. Hosts that localize can drop a
//! `messages.json` into the data directory; any key it sets overrides the
//! built-in English text, missing keys keep their defaults.

use fs_err as fs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GuardError, Result};
use crate::storage::StorageConfig;

/// Placeholder substituted with the project's folder name.
pub const FOLDER_PLACEHOLDER: &str = "{folder}";

static BUILTIN: Lazy<Messages> = Lazy::new(Messages::english);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Text of the problem marker.
    pub marker_message: String,
    /// Confirmation prompt. May contain `{folder}`.
    pub rename_warning: String,
    /// Label for the ignore checkbox on the project property page.
    pub ignore_setting_label: String,
    pub marker_creation_failed: String,
    pub marker_deletion_failed: String,
    pub ignore_flag_failed: String,
    pub workspace_refresh_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl Messages {
    fn english() -> Self {
        Messages {
            marker_message: "The project name must match the name of the folder that contains it."
                .to_string(),
            rename_warning: "Renaming this project is not recommended: its name no longer \
                             matches the name of its folder. Add project {folder} to the \
                             exceptions? This can also be changed later under \
                             Properties > Project Renaming."
                .to_string(),
            ignore_setting_label: "Ignore renames that leave the project name different from \
                                   its folder name (not recommended)"
                .to_string(),
            marker_creation_failed: "Failed to create the project name marker".to_string(),
            marker_deletion_failed: "Failed to delete the project name marker".to_string(),
            ignore_flag_failed: "Failed to access the rename-ignoring property".to_string(),
            workspace_refresh_failed: "Failed to refresh the workspace".to_string(),
        }
    }

    /// The built-in bundle, shared for the life of the process.
    pub fn builtin() -> &'static Messages {
        &BUILTIN
    }

    /// Overlays the JSON file at `path` on the built-in bundle.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Messages::default());
        }
        let content = fs::read_to_string(path).map_err(|source| GuardError::Io {
            context: format!("read messages {}", path.display()),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| GuardError::ConfigMalformed {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }

    /// Loads `messages.json` from the data directory, falling back to the
    /// built-in bundle when it is missing or malformed.
    pub fn load_with_storage(storage: &StorageConfig) -> Self {
        match Messages::load(&storage.messages_file()) {
            Ok(messages) => messages,
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring messages override");
                Messages::default()
            }
        }
    }

    /// Confirmation prompt for a project whose folder is `folder_name`.
    pub fn rename_warning_for(&self, folder_name: &str) -> String {
        self.rename_warning.replace(FOLDER_PLACEHOLDER, folder_name)
    }
}
