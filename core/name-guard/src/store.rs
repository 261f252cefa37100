//! File-backed marker and property stores.
//!
//! Each store is one JSON document in the data directory:
//!
//! ```json
//! // markers.json
//! { "version": 1, "markers": { "<project>": [ { ...Marker... } ] } }
//!
//! // properties.json
//! { "version": 1, "properties": { "<project>": { "<qualifier>": { "<name>": "true" } } } }
//! ```
//!
//! Every call re-reads the file, so writes by another process are visible on
//! the next call. Read-modify-write cycles within this process are serialized
//! by a mutex.
//!
//! # Failure Modes
//!
//! - Missing or empty file: empty store
//! - Corrupt JSON or unknown version: storage error, and the file is left as-is
//!   so a newer writer's data is never clobbered
//!
//! # Atomic Writes
//!
//! Uses temp file + rename so a crash mid-write never leaves a truncated file.

use fs_err as fs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

use crate::error::{GuardError, Result};
use crate::host::{MarkerBackend, PropertyBackend};
use crate::storage::StorageConfig;
use crate::types::{Marker, MarkerId, NewMarker, ProjectId, PropertyKey};

const STORE_VERSION: u32 = 1;

trait Versioned {
    fn version(&self) -> u32;
}

#[derive(Debug, Serialize, Deserialize)]
struct MarkerFile {
    version: u32,
    #[serde(default)]
    markers: BTreeMap<ProjectId, Vec<Marker>>,
}

impl Default for MarkerFile {
    fn default() -> Self {
        MarkerFile {
            version: STORE_VERSION,
            markers: BTreeMap::new(),
        }
    }
}

impl Versioned for MarkerFile {
    fn version(&self) -> u32 {
        self.version
    }
}

type QualifiedValues = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Serialize, Deserialize)]
struct PropertyFile {
    version: u32,
    #[serde(default)]
    properties: BTreeMap<ProjectId, QualifiedValues>,
}

impl Default for PropertyFile {
    fn default() -> Self {
        PropertyFile {
            version: STORE_VERSION,
            properties: BTreeMap::new(),
        }
    }
}

impl Versioned for PropertyFile {
    fn version(&self) -> u32 {
        self.version
    }
}

fn load_document<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default + Versioned,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(GuardError::Io {
                context: format!("read {}", path.display()),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    let document: T = serde_json::from_str(&content).map_err(|source| GuardError::Json {
        context: format!("parse {}", path.display()),
        source,
    })?;
    if document.version() != STORE_VERSION {
        return Err(GuardError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: document.version(),
            expected: STORE_VERSION,
        });
    }
    Ok(document)
}

fn save_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let io_error = |context: &str, source| GuardError::Io {
        context: format!("{} {}", context, path.display()),
        source,
    };

    let parent_dir = path
        .parent()
        .ok_or_else(|| GuardError::storage("save store", "store path has no parent directory"))?;
    fs::create_dir_all(parent_dir).map_err(|e| io_error("create directory for", e))?;

    let content = serde_json::to_string_pretty(document).map_err(|source| GuardError::Json {
        context: format!("serialize {}", path.display()),
        source,
    })?;

    let mut temp_file =
        NamedTempFile::new_in(parent_dir).map_err(|e| io_error("create temp file for", e))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| io_error("write temp file for", e))?;
    temp_file
        .flush()
        .map_err(|e| io_error("flush temp file for", e))?;
    temp_file
        .persist(path)
        .map_err(|e| io_error("replace", e.error))?;
    Ok(())
}

fn guard(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Markers
// ═══════════════════════════════════════════════════════════════════════════════

pub struct FileMarkerStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileMarkerStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_storage(storage: &StorageConfig) -> Self {
        Self::new(storage.markers_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarkerBackend for FileMarkerStore {
    fn find_markers(&self, project: &ProjectId) -> Result<Vec<Marker>> {
        let _guard = guard(&self.write_lock);
        let mut document: MarkerFile = load_document(&self.path)?;
        Ok(document.markers.remove(project).unwrap_or_default())
    }

    fn create_marker(&self, project: &ProjectId, marker: NewMarker) -> Result<Marker> {
        let _guard = guard(&self.write_lock);
        let mut document: MarkerFile = load_document(&self.path)?;
        let marker = Marker::from_new(project, marker);
        document
            .markers
            .entry(project.clone())
            .or_default()
            .push(marker.clone());
        save_document(&self.path, &document)?;
        Ok(marker)
    }

    fn delete_marker(&self, project: &ProjectId, marker: &MarkerId) -> Result<bool> {
        let _guard = guard(&self.write_lock);
        let mut document: MarkerFile = load_document(&self.path)?;
        let Some(list) = document.markers.get_mut(project) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|m| &m.id != marker);
        if list.len() == before {
            return Ok(false);
        }
        if list.is_empty() {
            document.markers.remove(project);
        }
        save_document(&self.path, &document)?;
        Ok(true)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════════

pub struct FilePropertyStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePropertyStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_storage(storage: &StorageConfig) -> Self {
        Self::new(storage.properties_file())
    }
}

impl PropertyBackend for FilePropertyStore {
    fn get_property(&self, project: &ProjectId, key: &PropertyKey) -> Result<Option<String>> {
        let _guard = guard(&self.write_lock);
        let document: PropertyFile = load_document(&self.path)?;
        Ok(document
            .properties
            .get(project)
            .and_then(|qualified| qualified.get(&key.qualifier))
            .and_then(|values| values.get(&key.local_name))
            .cloned())
    }

    fn set_property(&self, project: &ProjectId, key: &PropertyKey, value: &str) -> Result<()> {
        let _guard = guard(&self.write_lock);
        let mut document: PropertyFile = load_document(&self.path)?;
        document
            .properties
            .entry(project.clone())
            .or_default()
            .entry(key.qualifier.clone())
            .or_default()
            .insert(key.local_name.clone(), value.to_string());
        save_document(&self.path, &document)
    }
}
