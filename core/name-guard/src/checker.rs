//! Name consistency check.
//!
//! Every "does this project match its folder" decision goes through
//! [`is_mismatch`]; nothing else compares names.

use crate::types::{ProjectInfo, Resource};
use std::path::Path;

/// True when the declared name differs from the folder name.
///
/// Exact, case-sensitive, byte-wise.
pub fn is_mismatch(declared_name: &str, folder_name: &str) -> bool {
    declared_name != folder_name
}

/// Folder name backing a project: the last segment of its location, or the
/// declared name when the host has no location for it.
pub fn folder_name(info: &ProjectInfo) -> String {
    folder_name_from(info.location.as_deref(), &info.name)
}

/// Same as [`folder_name`], for a resource snapshot carried by an event.
pub fn resource_folder_name(resource: &Resource) -> String {
    folder_name_from(resource.location.as_deref(), &resource.name)
}

fn folder_name_from(location: Option<&Path>, fallback: &str) -> String {
    location
        .and_then(|path| path.file_name())
        .map(|segment| segment.to_string_lossy().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// Live check of a registry snapshot.
pub fn project_mismatch(info: &ProjectInfo) -> bool {
    is_mismatch(&info.name, &folder_name(info))
}
