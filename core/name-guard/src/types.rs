//! Core types shared by the engine, its stores and host integrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// Projects
// ═══════════════════════════════════════════════════════════════════════════════

/// Stable handle the host registry uses for a project.
///
/// Opaque to name-guard: it is never parsed, only compared and stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ProjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        ProjectId::new(id)
    }
}

impl From<String> for ProjectId {
    fn from(id: String) -> Self {
        ProjectId(id)
    }
}

/// Read-only snapshot of a project as the registry currently sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: ProjectId,
    /// Declared (logical) project name.
    pub name: String,
    /// Backing directory. `None` for projects the host has not materialized.
    pub location: Option<PathBuf>,
    pub open: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Markers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    /// Generates a fresh, time-sortable id.
    pub fn generate() -> Self {
        MarkerId(ulid::Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Problem,
    Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Attributes for a marker that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMarker {
    pub kind: MarkerKind,
    pub severity: Severity,
    pub message: String,
    pub location: Option<String>,
    pub editable: bool,
    /// Owner tag. Lookups match on this, never on message text.
    pub tag: Option<String>,
}

/// A diagnostic record attached to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub project: ProjectId,
    pub kind: MarkerKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub location: Option<String>,
    pub editable: bool,
    #[serde(default)]
    pub tag: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Marker {
    pub fn from_new(project: &ProjectId, new: NewMarker) -> Self {
        Marker {
            id: MarkerId::generate(),
            project: project.clone(),
            kind: new.kind,
            severity: new.severity,
            message: new.message,
            location: new.location,
            editable: new.editable,
            tag: new.tag,
            created_at: Utc::now(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════════

/// Two-part key for a persistent per-project property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyKey {
    pub qualifier: String,
    pub local_name: String,
}

impl PropertyKey {
    pub fn new(qualifier: impl Into<String>, local_name: impl Into<String>) -> Self {
        PropertyKey {
            qualifier: qualifier.into(),
            local_name: local_name.into(),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.qualifier, self.local_name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Resource Events
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Project,
    Folder,
    File,
}

/// The resource a change notification is about, as seen at delivery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: ProjectId,
    pub kind: ResourceKind,
    pub name: String,
    pub location: Option<PathBuf>,
}

impl Resource {
    pub fn project(
        id: impl Into<ProjectId>,
        name: impl Into<String>,
        location: Option<PathBuf>,
    ) -> Self {
        Resource {
            id: id.into(),
            kind: ResourceKind::Project,
            name: name.into(),
            location,
        }
    }

    pub fn is_project(&self) -> bool {
        self.kind == ResourceKind::Project
    }
}

impl From<&ProjectInfo> for Resource {
    fn from(info: &ProjectInfo) -> Self {
        Resource::project(info.id.clone(), info.name.clone(), info.location.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaKind {
    Added,
    Changed,
    Removed,
}

/// One top-level entry of a post-build delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDelta {
    pub project: ProjectId,
    pub kind: DeltaKind,
}

impl ResourceDelta {
    pub fn added(project: impl Into<ProjectId>) -> Self {
        ResourceDelta {
            project: project.into(),
            kind: DeltaKind::Added,
        }
    }

    pub fn changed(project: impl Into<ProjectId>) -> Self {
        ResourceDelta {
            project: project.into(),
            kind: DeltaKind::Changed,
        }
    }

    pub fn removed(project: impl Into<ProjectId>) -> Self {
        ResourceDelta {
            project: project.into(),
            kind: DeltaKind::Removed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreChange,
    PreRefresh,
    PostBuild,
}

/// A change notification, in the order the host delivers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    /// Before a mutation is applied to the resource.
    PreChange(Resource),
    /// Before the host reconciles its model with the filesystem.
    PreRefresh(Resource),
    /// After the build/refresh cycle, with the top-level delta.
    PostBuild(Vec<ResourceDelta>),
}

impl ResourceEvent {
    pub fn phase(&self) -> Phase {
        match self {
            ResourceEvent::PreChange(_) => Phase::PreChange,
            ResourceEvent::PreRefresh(_) => Phase::PreRefresh,
            ResourceEvent::PostBuild(_) => Phase::PostBuild,
        }
    }
}
