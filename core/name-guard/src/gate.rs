//! Confirmation prompt shown on the first mismatch of a project.

use crate::host::ConfirmationGate;
use crate::messages::Messages;
use crate::types::ProjectId;

/// What the host renders in its modal dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub project: ProjectId,
    /// Folder name at the time of asking; the answer is stored under it.
    pub folder_name: String,
    pub message: String,
}

impl ConfirmationRequest {
    pub fn new(project: &ProjectId, folder_name: &str, messages: &Messages) -> Self {
        ConfirmationRequest {
            project: project.clone(),
            folder_name: folder_name.to_string(),
            message: messages.rename_warning_for(folder_name),
        }
    }
}

/// Always gives the same answer. For hosts without a UI.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswerGate {
    ignore: bool,
}

impl FixedAnswerGate {
    pub fn new(ignore: bool) -> Self {
        Self { ignore }
    }

    /// Never ignores: every mismatch keeps its marker.
    pub fn decline() -> Self {
        Self::new(false)
    }
}

impl ConfirmationGate for FixedAnswerGate {
    fn confirm(&self, request: &ConfirmationRequest) -> bool {
        tracing::debug!(
            project = %request.project,
            folder = %request.folder_name,
            ignore = self.ignore,
            "Answering rename confirmation without prompting"
        );
        self.ignore
    }
}
