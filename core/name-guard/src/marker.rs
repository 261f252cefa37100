//! The name-mismatch problem marker.
//!
//! A project carries at most one marker tagged [`PROBLEM_NAME_TAG`]. Other
//! tools' problem markers on the same project are never read or touched.

use crate::error::Result;
use crate::host::{MarkerBackend, ProjectRegistry};
use crate::types::{Marker, MarkerKind, NewMarker, ProjectId, Severity};

/// Tag attribute value identifying markers owned by name-guard.
pub const PROBLEM_NAME_TAG: &str = "problemName";

/// Idempotent marker operations for one project.
///
/// Holds no state of its own; every call goes to the backend.
pub struct MarkerStore<'a> {
    backend: &'a dyn MarkerBackend,
    registry: &'a dyn ProjectRegistry,
    project: &'a ProjectId,
    message: &'a str,
}

impl<'a> MarkerStore<'a> {
    pub fn new(
        backend: &'a dyn MarkerBackend,
        registry: &'a dyn ProjectRegistry,
        project: &'a ProjectId,
        message: &'a str,
    ) -> Self {
        Self {
            backend,
            registry,
            project,
            message,
        }
    }

    /// Creates the marker unless one exists or the project is not open.
    ///
    /// Returns true only when a marker was actually written.
    pub fn create_marker(&self) -> Result<bool> {
        let info = match self.registry.project(self.project) {
            Some(info) if info.open => info,
            _ => return Ok(false),
        };
        if self.marker_exists()? {
            return Ok(false);
        }

        let marker = NewMarker {
            kind: MarkerKind::Problem,
            severity: Severity::Error,
            message: self.message.to_string(),
            location: info
                .location
                .as_ref()
                .map(|path| path.to_string_lossy().to_string()),
            editable: false,
            tag: Some(PROBLEM_NAME_TAG.to_string()),
        };
        self.backend.create_marker(self.project, marker)?;
        Ok(true)
    }

    /// Removes the marker if present. Returns true when one was removed.
    pub fn delete_marker(&self) -> Result<bool> {
        match self.find_marker()? {
            Some(marker) => self.backend.delete_marker(self.project, &marker.id),
            None => Ok(false),
        }
    }

    pub fn marker_exists(&self) -> Result<bool> {
        Ok(self.find_marker()?.is_some())
    }

    pub fn find_marker(&self) -> Result<Option<Marker>> {
        Ok(self
            .backend
            .find_markers(self.project)?
            .into_iter()
            .find(is_problem_name_marker))
    }
}

fn is_problem_name_marker(marker: &Marker) -> bool {
    marker.kind == MarkerKind::Problem && marker.tag.as_deref() == Some(PROBLEM_NAME_TAG)
}
