use serde::{Deserialize, Serialize};

use crate::EventSource;
use taskwatch_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod poll;
pub mod task;

pub use general::*;
pub use poll::*;
pub use task::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings, errors, notifications and hook requests
    General(GeneralEvent),

    /// Card lifecycle and render updates
    Task(TaskEvent),

    /// Polling diagnostics
    Poll(PollEvent),
}

impl AppEvent {
    /// Identify the source domain for this event
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Task(_) => EventSource::TASK,
            Self::Poll(_) => EventSource::POLL,
        }
    }

    /// Task this event belongs to, if any
    #[must_use]
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::General(GeneralEvent::FileListingRefreshRequested { task_id }) => Some(task_id),
            Self::General(_) => None,
            Self::Task(event) => Some(event.task_id()),
            Self::Poll(event) => Some(event.task_id()),
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use taskwatch_types::Severity;
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Notification {
                severity: Severity::Error,
                ..
            }) => Level::ERROR,

            Self::Task(TaskEvent::LogAppended { line, .. }) if line.severity == Severity::Error => {
                Level::ERROR
            }

            Self::General(GeneralEvent::Notification {
                severity: Severity::Warning,
                ..
            })
            | Self::Poll(PollEvent::NetworkError { .. } | PollEvent::TimedOut { .. }) => {
                Level::WARN
            }

            Self::Task(TaskEvent::CardUpdated { .. })
            | Self::Poll(PollEvent::StaleResponse { .. } | PollEvent::LateResponse { .. }) => {
                Level::DEBUG
            }

            Self::Poll(PollEvent::Issued { .. }) => Level::TRACE,

            // Default to INFO for lifecycle events
            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "taskwatch::events::general",
            Self::Task(_) => "taskwatch::events::task",
            Self::Poll(_) => "taskwatch::events::poll",
        }
    }
}
