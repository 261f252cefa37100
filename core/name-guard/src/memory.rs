//! In-process implementations of every host trait.
//!
//! Useful for hosts that keep their model in memory and for tests. Each
//! backend can be told to fail so error paths are reachable without a real
//! broken disk.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{GuardError, Result};
use crate::gate::ConfirmationRequest;
use crate::host::{
    ConfirmationGate, MarkerBackend, ProjectRegistry, PropertyBackend, RefreshTrigger,
};
use crate::types::{Marker, MarkerId, NewMarker, ProjectId, ProjectInfo, PropertyKey};

// Poisoned state is still usable; a panicking test thread must not cascade.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MemoryRegistry {
    projects: Mutex<BTreeMap<ProjectId, ProjectInfo>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an open project whose id is its declared name.
    pub fn add_project(&self, name: &str, location: PathBuf) -> ProjectId {
        let id = ProjectId::new(name);
        self.insert(ProjectInfo {
            id: id.clone(),
            name: name.to_string(),
            location: Some(location),
            open: true,
        });
        id
    }

    pub fn insert(&self, info: ProjectInfo) {
        lock(&self.projects).insert(info.id.clone(), info);
    }

    pub fn remove(&self, id: &ProjectId) -> Option<ProjectInfo> {
        lock(&self.projects).remove(id)
    }

    pub fn set_open(&self, id: &ProjectId, open: bool) {
        if let Some(info) = lock(&self.projects).get_mut(id) {
            info.open = open;
        }
    }

    /// Renames the backing directory, keeping its parent.
    pub fn rename_folder(&self, id: &ProjectId, folder: &str) {
        if let Some(info) = lock(&self.projects).get_mut(id) {
            let parent = info
                .location
                .as_ref()
                .and_then(|path| path.parent())
                .map(|parent| parent.to_path_buf())
                .unwrap_or_default();
            info.location = Some(parent.join(folder));
        }
    }

    /// Changes the declared name only.
    pub fn rename_project(&self, id: &ProjectId, name: &str) {
        if let Some(info) = lock(&self.projects).get_mut(id) {
            info.name = name.to_string();
        }
    }
}

impl ProjectRegistry for MemoryRegistry {
    fn open_projects(&self) -> Vec<ProjectId> {
        lock(&self.projects)
            .values()
            .filter(|info| info.open)
            .map(|info| info.id.clone())
            .collect()
    }

    fn project(&self, id: &ProjectId) -> Option<ProjectInfo> {
        lock(&self.projects).get(id).cloned()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Markers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MemoryMarkers {
    markers: Mutex<BTreeMap<ProjectId, Vec<Marker>>>,
    fail_writes: AtomicBool,
    failing_project: Mutex<Option<ProjectId>>,
}

impl MemoryMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers_for(&self, project: &ProjectId) -> Vec<Marker> {
        lock(&self.markers).get(project).cloned().unwrap_or_default()
    }

    /// Makes every create/delete fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every operation on one project fail.
    pub fn fail_project(&self, project: Option<ProjectId>) {
        *lock(&self.failing_project) = project;
    }

    fn check(&self, project: &ProjectId, write: bool, operation: &str) -> Result<()> {
        let project_fails = lock(&self.failing_project).as_ref() == Some(project);
        if project_fails || (write && self.fail_writes.load(Ordering::SeqCst)) {
            return Err(GuardError::storage(operation, "injected marker store failure"));
        }
        Ok(())
    }
}

impl MarkerBackend for MemoryMarkers {
    fn find_markers(&self, project: &ProjectId) -> Result<Vec<Marker>> {
        self.check(project, false, "find_markers")?;
        Ok(self.markers_for(project))
    }

    fn create_marker(&self, project: &ProjectId, marker: NewMarker) -> Result<Marker> {
        self.check(project, true, "create_marker")?;
        let marker = Marker::from_new(project, marker);
        lock(&self.markers)
            .entry(project.clone())
            .or_default()
            .push(marker.clone());
        Ok(marker)
    }

    fn delete_marker(&self, project: &ProjectId, marker: &MarkerId) -> Result<bool> {
        self.check(project, true, "delete_marker")?;
        let mut markers = lock(&self.markers);
        let Some(list) = markers.get_mut(project) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|m| &m.id != marker);
        Ok(list.len() != before)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MemoryProperties {
    values: Mutex<BTreeMap<(ProjectId, String, String), String>>,
    fail: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every read and write fail.
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Makes writes fail while reads keep working.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        lock(&self.values).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, operation: &str, write: bool) -> Result<()> {
        let writes_fail = write && self.fail_writes.load(Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) || writes_fail {
            return Err(GuardError::storage(operation, "injected property store failure"));
        }
        Ok(())
    }
}

impl PropertyBackend for MemoryProperties {
    fn get_property(&self, project: &ProjectId, key: &PropertyKey) -> Result<Option<String>> {
        self.check("get_property", false)?;
        Ok(lock(&self.values)
            .get(&(project.clone(), key.qualifier.clone(), key.local_name.clone()))
            .cloned())
    }

    fn set_property(&self, project: &ProjectId, key: &PropertyKey, value: &str) -> Result<()> {
        self.check("set_property", true)?;
        lock(&self.values).insert(
            (project.clone(), key.qualifier.clone(), key.local_name.clone()),
            value.to_string(),
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Gate and Refresh
// ═══════════════════════════════════════════════════════════════════════════════

/// Answers with a configurable choice and remembers every request.
pub struct RecordingGate {
    answer: AtomicBool,
    requests: Mutex<Vec<ConfirmationRequest>>,
}

impl RecordingGate {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: AtomicBool::new(answer),
            requests: Mutex::new(vec![]),
        }
    }

    pub fn set_answer(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<ConfirmationRequest> {
        lock(&self.requests).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl ConfirmationGate for RecordingGate {
    fn confirm(&self, request: &ConfirmationRequest) -> bool {
        lock(&self.requests).push(request.clone());
        self.answer.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct CountingRefresh {
    count: AtomicUsize,
    fail: AtomicBool,
}

impl CountingRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl RefreshTrigger for CountingRefresh {
    fn refresh(&self) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(GuardError::RefreshFailed("injected refresh failure".to_string()));
        }
        Ok(())
    }
}
