use serde::{Deserialize, Serialize};
use taskwatch_types::Severity;

/// Outward hooks of the tracker that are not tied to a card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Toast shown outside the task's own card
    Notification { message: String, severity: Severity },

    /// A finished download should refresh the file listing view
    FileListingRefreshRequested { task_id: String },
}
