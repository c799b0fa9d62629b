//! Zip download state
//!
//! Zipping all of a song's tracks runs as a backend task. The client moves
//! through Ready → InProgress → Succeeded/Failed and back to Ready once the
//! archive is downloaded or the failure is acknowledged.

use crate::models::Task;
use serde::{Deserialize, Serialize};

/// Where a zip download currently stands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZipState {
    Disabled,
    #[default]
    Ready,
    InProgress { task_id: String },
    Succeeded { download_url: String },
    Failed,
}

/// What the caller should do after a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZipAction {
    /// Nothing to do
    None,
    /// Submit a new zip request to the backend
    Submit,
    /// Fetch the finished archive
    Download(String),
}

impl ZipState {
    /// Short description of the state for display
    pub fn description(&self) -> &'static str {
        match self {
            ZipState::Disabled => "Zipping disabled.",
            ZipState::Ready => "Create a zip file with all tracks.",
            ZipState::InProgress { .. } => "Zipping in progress.",
            ZipState::Succeeded { .. } => "Zip file ready. Click to download.",
            ZipState::Failed => "Failed to create zip file. Click to clear.",
        }
    }

    /// Handle a click.
    ///
    /// Downloading and clearing a failure both return to `Ready`; a click
    /// while disabled or in progress changes nothing.
    pub fn click(&mut self) -> ZipAction {
        match std::mem::replace(self, ZipState::Ready) {
            ZipState::Ready => ZipAction::Submit,
            ZipState::Succeeded { download_url } => ZipAction::Download(download_url),
            ZipState::Failed => ZipAction::None,
            other @ (ZipState::Disabled | ZipState::InProgress { .. }) => {
                *self = other;
                ZipAction::None
            }
        }
    }

    /// Record that the backend accepted a zip request
    pub fn submitted(&mut self, task_id: impl Into<String>) {
        if *self == ZipState::Ready {
            *self = ZipState::InProgress {
                task_id: task_id.into(),
            };
        }
    }

    /// Record the outcome of the zip task; ignored unless it is the task in progress
    pub fn task_ended(&mut self, task: &Task) {
        let ZipState::InProgress { task_id } = self else {
            return;
        };
        if *task_id != task.id {
            return;
        }
        *self = match task.download_url() {
            Some(url) if task.succeeded() => ZipState::Succeeded {
                download_url: url.to_string(),
            },
            _ => ZipState::Failed,
        };
    }
}
