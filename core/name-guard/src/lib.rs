//! # name-guard
//!
//! Keeps a project's declared name and the name of its backing folder honest.
//! When they diverge, the project gets one error marker; when they agree again,
//! or the user chose to ignore the divergence, the marker goes away.
//!
//! ## Design Principles
//!
//! - **Host-agnostic**: the registry, marker store, property store, dialog and
//!   refresh command are traits in [`host`]. File-backed and in-memory
//!   implementations ship in [`store`] and [`memory`].
//! - **Synchronous**: no async runtime. The host delivers events serially on its
//!   own dispatch thread.
//! - **Never fatal**: storage failures are logged and reported, not raised out of
//!   the pipeline.
//! - **Idempotent**: at most one name marker per project, however often a cycle
//!   runs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use name_guard::{GuardConfig, Host, NameGuard, ResourceEvent};
//!
//! let mut guard = NameGuard::new(host, GuardConfig::default());
//! guard.startup();
//! // from the host's change listener:
//! guard.handle(&ResourceEvent::PreChange(resource));
//! ```

pub mod checker;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod host;
pub mod ignore;
pub mod logging;
pub mod marker;
pub mod memory;
pub mod messages;
pub mod storage;
pub mod store;
pub mod types;

pub use checker::{folder_name, is_mismatch};
pub use config::{load_config_with_storage, save_config_with_storage, GuardConfig};
pub use engine::{NameGuard, Operation, PendingCheck, ReconcileReport, ValidateMode};
pub use error::{GuardError, Result};
pub use gate::{ConfirmationRequest, FixedAnswerGate};
pub use host::{
    ConfirmationGate, Host, MarkerBackend, NoopRefresh, ProjectRegistry, PropertyBackend,
    RefreshTrigger,
};
pub use ignore::{IgnorePolicy, RENAME_IGNORING_KEY};
pub use marker::{MarkerStore, PROBLEM_NAME_TAG};
pub use messages::Messages;
pub use storage::StorageConfig;
pub use store::{FileMarkerStore, FilePropertyStore};
pub use types::*;
