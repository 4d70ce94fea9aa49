//! Task tracker error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackerError {
    #[error("task id must not be empty")]
    EmptyTaskId,

    #[error("unknown task type: {value}")]
    UnknownTaskType { value: String },

    #[error("invalid metadata entry: {entry}")]
    InvalidMetadata { entry: String },

    #[error("missing tracker component: {component}")]
    MissingComponent { component: String },
}

impl UserFacingError for TrackerError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptyTaskId => Some("Use the task_id returned by the job submission."),
            Self::UnknownTaskType { .. } => Some("Valid task types are single, batch and playlist."),
            Self::InvalidMetadata { .. } => Some("Metadata entries take the form KEY=VALUE."),
            Self::MissingComponent { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::EmptyTaskId => "tracker.empty_task_id",
            Self::UnknownTaskType { .. } => "tracker.unknown_task_type",
            Self::InvalidMetadata { .. } => "tracker.invalid_metadata",
            Self::MissingComponent { .. } => "tracker.missing_component",
        })
    }
}
