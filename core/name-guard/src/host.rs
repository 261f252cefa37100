//! Interfaces name-guard consumes from the host environment.
//!
//! The host owns projects, markers, properties and the UI. name-guard only
//! talks to them through these traits, so any host (an IDE bridge, a test
//! harness, the in-memory backends in [`crate::memory`]) can drive the engine.
//!
//! Implementors should:
//! - Never panic; report failures through [`GuardError`](crate::GuardError)
//! - Make each call visible to other readers immediately (no write-behind)
//! - Be callable from the host's dispatch thread without blocking for long,
//!   except [`ConfirmationGate::confirm`], which is modal by contract

use std::sync::Arc;

use crate::error::Result;
use crate::gate::ConfirmationRequest;
use crate::types::{Marker, MarkerId, NewMarker, ProjectId, ProjectInfo, PropertyKey};

/// The host's project registry.
pub trait ProjectRegistry: Send + Sync {
    /// Ids of every currently open project.
    fn open_projects(&self) -> Vec<ProjectId>;

    /// Current snapshot of a project, or `None` if it no longer exists.
    fn project(&self, id: &ProjectId) -> Option<ProjectInfo>;
}

/// The host's diagnostic marker store.
pub trait MarkerBackend: Send + Sync {
    /// All markers attached directly to the project.
    fn find_markers(&self, project: &ProjectId) -> Result<Vec<Marker>>;

    fn create_marker(&self, project: &ProjectId, marker: NewMarker) -> Result<Marker>;

    /// Returns false if the marker was already gone.
    fn delete_marker(&self, project: &ProjectId, marker: &MarkerId) -> Result<bool>;
}

/// The host's persistent per-project key/value store.
pub trait PropertyBackend: Send + Sync {
    fn get_property(&self, project: &ProjectId, key: &PropertyKey) -> Result<Option<String>>;

    fn set_property(&self, project: &ProjectId, key: &PropertyKey, value: &str) -> Result<()>;
}

/// Modal yes/no prompt.
///
/// Returns true when the user chose to ignore the mismatch. Blocks until the
/// user answers.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, request: &ConfirmationRequest) -> bool;
}

/// Command that makes the registry re-sync with the filesystem.
pub trait RefreshTrigger: Send + Sync {
    fn refresh(&self) -> Result<()>;
}

/// Handles to every host collaborator the engine needs.
#[derive(Clone)]
pub struct Host {
    pub registry: Arc<dyn ProjectRegistry>,
    pub markers: Arc<dyn MarkerBackend>,
    pub properties: Arc<dyn PropertyBackend>,
    pub gate: Arc<dyn ConfirmationGate>,
    pub refresh: Arc<dyn RefreshTrigger>,
}

/// Refresh trigger for hosts that re-sync on their own.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRefresh;

impl RefreshTrigger for NoopRefresh {
    fn refresh(&self) -> Result<()> {
        Ok(())
    }
}
