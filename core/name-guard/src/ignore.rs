//! Persisted "ignore renaming" flag.
//!
//! The property key is `(folder name, RENAME_IGNORING_KEY)` and is derived from
//! the live registry on every call. A project whose folder is renamed again is
//! looked up under the new folder name, so an earlier decision does not follow it.

use crate::checker::folder_name;
use crate::error::{GuardError, Result};
use crate::host::{ProjectRegistry, PropertyBackend};
use crate::types::{ProjectId, PropertyKey};

pub const RENAME_IGNORING_KEY: &str = "RENAME_IGNORING_KEY";

pub struct IgnorePolicy<'a> {
    backend: &'a dyn PropertyBackend,
    registry: &'a dyn ProjectRegistry,
}

impl<'a> IgnorePolicy<'a> {
    pub fn new(backend: &'a dyn PropertyBackend, registry: &'a dyn ProjectRegistry) -> Self {
        Self { backend, registry }
    }

    /// Whether the user has ever answered for this project's current folder.
    pub fn exists(&self, project: &ProjectId) -> Result<bool> {
        Ok(self.read(project)?.is_some())
    }

    /// Absent key reads as not ignoring.
    pub fn get(&self, project: &ProjectId) -> Result<bool> {
        Ok(self
            .read(project)?
            .is_some_and(|value| value.eq_ignore_ascii_case("true")))
    }

    pub fn set(&self, project: &ProjectId, ignoring: bool) -> Result<()> {
        let key = self.key(project)?;
        self.backend
            .set_property(project, &key, if ignoring { "true" } else { "false" })
    }

    pub fn key(&self, project: &ProjectId) -> Result<PropertyKey> {
        let info = self
            .registry
            .project(project)
            .ok_or_else(|| GuardError::StaleResource(project.clone()))?;
        Ok(PropertyKey::new(folder_name(&info), RENAME_IGNORING_KEY))
    }

    fn read(&self, project: &ProjectId) -> Result<Option<String>> {
        let key = self.key(project)?;
        self.backend.get_property(project, &key)
    }
}
