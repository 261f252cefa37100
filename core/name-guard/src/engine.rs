//! NameGuard - the name-consistency pipeline.
//!
//! The host delivers three signals per change, in order:
//!
//! ```text
//! PreChange(resource)   capture the folder name before the host mutates its model
//! PreRefresh(resource)  compare the new name to the captured one, resolve target
//! PostBuild(delta)      reconcile the marker, ask once, refresh if anything changed
//! ```
//!
//! Captured state lives in one [`PendingCheck`] per resource id, so sequences
//! for different resources can interleave without clobbering each other.
//!
//! # Failure Handling
//!
//! Nothing here is fatal to the host. A marker or property failure is logged
//! with the operation and project, recorded in the [`ReconcileReport`], and
//! processing continues with the next project. A project that vanished
//! mid-cycle is skipped quietly. No operation is retried internally; the next
//! natural event gets another chance.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::checker::{folder_name, is_mismatch, project_mismatch, resource_folder_name};
use crate::config::GuardConfig;
use crate::error::{GuardError, Result};
use crate::gate::ConfirmationRequest;
use crate::host::Host;
use crate::ignore::IgnorePolicy;
use crate::marker::MarkerStore;
use crate::messages::Messages;
use crate::types::{DeltaKind, Phase, ProjectId, Resource, ResourceDelta, ResourceEvent};

/// Whether a reconciliation may show the confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateMode {
    Interactive,
    Silent,
}

/// The step that failed, for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ResolveProject,
    ReadIgnore,
    WriteIgnore,
    CreateMarker,
    DeleteMarker,
}

/// State carried from pre-change to post-build for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCheck {
    pub captured_folder_name: String,
    pub mismatch_detected: bool,
    /// Set at pre-refresh, only if the project still existed then.
    pub target_project: Option<ProjectId>,
    pub phase: Phase,
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<ProjectId>,
    pub deleted: Vec<ProjectId>,
    pub prompted: Vec<ProjectId>,
    pub failed: Vec<ProjectId>,
    pub refreshed: bool,
}

impl ReconcileReport {
    /// True when a marker was created or deleted. A marker created and
    /// removed again in the same cycle does not count.
    pub fn changed(&self) -> bool {
        !self.created.is_empty() || !self.deleted.is_empty()
    }

    fn fail(&mut self, project: &ProjectId) {
        if !self.failed.contains(project) {
            self.failed.push(project.clone());
        }
    }
}

pub struct NameGuard {
    host: Host,
    config: GuardConfig,
    messages: Arc<Messages>,
    pending: HashMap<ProjectId, PendingCheck>,
}

impl NameGuard {
    pub fn new(host: Host, config: GuardConfig) -> Self {
        Self::with_messages(host, config, Arc::new(Messages::default()))
    }

    pub fn with_messages(host: Host, config: GuardConfig, messages: Arc<Messages>) -> Self {
        Self {
            host,
            config,
            messages,
            pending: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Number of resources with a pipeline sequence in flight.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self, id: &ProjectId) -> Option<&PendingCheck> {
        self.pending.get(id)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Event Pipeline
    // ─────────────────────────────────────────────────────────────────────────────

    /// Feeds one change notification through the pipeline.
    ///
    /// Only post-build does marker work, so the report is empty for the other
    /// phases.
    pub fn handle(&mut self, event: &ResourceEvent) -> ReconcileReport {
        match event {
            ResourceEvent::PreChange(resource) => {
                self.pre_change(resource);
                ReconcileReport::default()
            }
            ResourceEvent::PreRefresh(resource) => {
                self.pre_refresh(resource);
                ReconcileReport::default()
            }
            ResourceEvent::PostBuild(delta) => self.post_build(delta),
        }
    }

    fn pre_change(&mut self, resource: &Resource) {
        if !resource.is_project() {
            return;
        }
        let captured = resource_folder_name(resource);
        debug!(project = %resource.id, folder = %captured, "Captured folder name before change");
        self.pending.insert(
            resource.id.clone(),
            PendingCheck {
                captured_folder_name: captured,
                mismatch_detected: false,
                target_project: None,
                phase: Phase::PreChange,
            },
        );
    }

    fn pre_refresh(&mut self, resource: &Resource) {
        let exists = self.host.registry.project(&resource.id).is_some();
        let Some(check) = self.pending.get_mut(&resource.id) else {
            return;
        };

        check.mismatch_detected = is_mismatch(&resource.name, &check.captured_folder_name);
        check.target_project = exists.then(|| resource.id.clone());
        check.phase = Phase::PreRefresh;
        debug!(
            project = %resource.id,
            new_name = %resource.name,
            captured = %check.captured_folder_name,
            mismatch = check.mismatch_detected,
            exists,
            "Diagnosed name before refresh"
        );
    }

    fn post_build(&mut self, delta: &[ResourceDelta]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut handled = HashSet::new();

        // Sorted so one cycle always processes projects in the same order.
        let mut checks: Vec<PendingCheck> =
            self.pending.drain().map(|(_, check)| check).collect();
        checks.sort_by(|a, b| a.target_project.cmp(&b.target_project));

        for check in checks {
            let Some(target) = check.target_project else {
                continue;
            };
            self.reconcile(
                &target,
                check.mismatch_detected,
                ValidateMode::Interactive,
                &mut report,
            );
            handled.insert(target);
        }

        if self.config.validate_added_projects {
            for entry in delta.iter().filter(|entry| entry.kind == DeltaKind::Added) {
                if handled.insert(entry.project.clone()) {
                    self.check_live(&entry.project, ValidateMode::Interactive, &mut report);
                }
            }
        }

        self.finish_cycle(&mut report);
        report
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Live Checks
    // ─────────────────────────────────────────────────────────────────────────────

    /// Reconciles every open project against its live folder name.
    pub fn validate_all(&self, mode: ValidateMode) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for id in self.host.registry.open_projects() {
            self.check_live(&id, mode, &mut report);
        }
        self.finish_cycle(&mut report);
        report
    }

    /// Startup reconciliation of drift that happened while the host was down.
    pub fn startup(&self) -> ReconcileReport {
        let mode = if self.config.confirm_on_startup {
            ValidateMode::Interactive
        } else {
            ValidateMode::Silent
        };
        let report = self.validate_all(mode);
        info!(
            created = report.created.len(),
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Startup name check complete"
        );
        report
    }

    pub fn validate_project(&self, id: &ProjectId, mode: ValidateMode) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        self.check_live(id, mode, &mut report);
        self.finish_cycle(&mut report);
        report
    }

    fn check_live(&self, id: &ProjectId, mode: ValidateMode, report: &mut ReconcileReport) {
        match self.host.registry.project(id) {
            Some(info) => self.reconcile(id, project_mismatch(&info), mode, report),
            None => debug!(project = %id, "Project vanished before live check"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Ignore Setting
    // ─────────────────────────────────────────────────────────────────────────────

    /// Current ignore flag, as shown on the project's property page.
    pub fn is_ignoring(&self, id: &ProjectId) -> Result<bool> {
        self.ignore_policy().get(id)
    }

    /// Stores the user's choice and reconciles that project without prompting.
    pub fn apply_ignore_setting(&self, id: &ProjectId, ignoring: bool) -> Result<ReconcileReport> {
        self.ignore_policy().set(id, ignoring)?;
        Ok(self.validate_project(id, ValidateMode::Silent))
    }

    pub fn restore_default_ignore_setting(&self, id: &ProjectId) -> Result<ReconcileReport> {
        self.apply_ignore_setting(id, false)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────────────

    fn ignore_policy(&self) -> IgnorePolicy<'_> {
        IgnorePolicy::new(self.host.properties.as_ref(), self.host.registry.as_ref())
    }

    fn marker_store<'a>(&'a self, id: &'a ProjectId) -> MarkerStore<'a> {
        MarkerStore::new(
            self.host.markers.as_ref(),
            self.host.registry.as_ref(),
            id,
            &self.messages.marker_message,
        )
    }

    fn reconcile(
        &self,
        id: &ProjectId,
        mismatch: bool,
        mode: ValidateMode,
        report: &mut ReconcileReport,
    ) {
        let Some(info) = self.host.registry.project(id) else {
            let stale = GuardError::StaleResource(id.clone());
            debug!(
                operation = ?Operation::ResolveProject,
                error = %stale,
                "Skipping vanished project"
            );
            return;
        };

        let policy = self.ignore_policy();
        let markers = self.marker_store(id);

        let ignoring = match policy.get(id) {
            Ok(ignoring) => ignoring,
            Err(err) => return self.record_failure(Operation::ReadIgnore, id, &err, report),
        };

        if ignoring || !mismatch {
            match markers.delete_marker() {
                Ok(true) => report.deleted.push(id.clone()),
                Ok(false) => {}
                Err(err) => self.record_failure(Operation::DeleteMarker, id, &err, report),
            }
            return;
        }

        match markers.create_marker() {
            Ok(true) => report.created.push(id.clone()),
            Ok(false) => return,
            Err(err) => return self.record_failure(Operation::CreateMarker, id, &err, report),
        }

        if mode == ValidateMode::Silent {
            return;
        }
        match policy.exists(id) {
            Ok(false) => {}
            Ok(true) => return,
            Err(err) => return self.record_failure(Operation::ReadIgnore, id, &err, report),
        }

        let request = ConfirmationRequest::new(id, &folder_name(&info), &self.messages);
        let ignore = self.host.gate.confirm(&request);
        report.prompted.push(id.clone());
        info!(project = %id, folder = %request.folder_name, ignore, "Rename confirmation answered");

        // An unsaved answer leaves the marker. The next cycle finds it and
        // does not ask again.
        if let Err(err) = policy.set(id, ignore) {
            return self.record_failure(Operation::WriteIgnore, id, &err, report);
        }
        if !ignore {
            return;
        }

        // Net effect of create-then-delete within one cycle is no change.
        match markers.delete_marker() {
            Ok(_) => report.created.retain(|created| created != id),
            Err(err) => self.record_failure(Operation::DeleteMarker, id, &err, report),
        }
    }

    fn record_failure(
        &self,
        operation: Operation,
        id: &ProjectId,
        err: &GuardError,
        report: &mut ReconcileReport,
    ) {
        if let GuardError::StaleResource(_) = err {
            debug!(operation = ?operation, project = %id, "Project vanished mid-cycle");
            return;
        }
        let summary = match operation {
            Operation::CreateMarker => &self.messages.marker_creation_failed,
            Operation::DeleteMarker => &self.messages.marker_deletion_failed,
            Operation::ResolveProject | Operation::ReadIgnore | Operation::WriteIgnore => {
                &self.messages.ignore_flag_failed
            }
        };
        warn!(operation = ?operation, project = %id, error = %err, "{}", summary);
        report.fail(id);
    }

    /// One refresh per cycle, and only if a marker actually changed.
    fn finish_cycle(&self, report: &mut ReconcileReport) {
        if !report.changed() || !self.config.refresh_on_change {
            return;
        }
        match self.host.refresh.refresh() {
            Ok(()) => report.refreshed = true,
            Err(err) => warn!(error = %err, "{}", self.messages.workspace_refresh_failed),
        }
    }
}
