#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in taskwatch
//!
//! The tracker never prints or renders anything itself. Every card change,
//! log line, notification and poll diagnostic is sent as an [`AppEvent`]
//! over an unbounded channel, and the consumer (the CLI, a test, a UI)
//! decides how to present it.

pub mod meta;
pub use meta::{EventEnvelope, EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, FailureContext, GeneralEvent, PollEvent, TaskEvent};

use std::time::Duration;
use taskwatch_types::{LogLine, Severity, TaskState, TaskType};
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented for the raw [`EventSender`] and for any struct that holds
/// one, so emission reads the same everywhere.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a toast-style notification
    fn emit_notification(&self, message: impl Into<String>, severity: Severity) {
        self.emit(AppEvent::General(GeneralEvent::Notification {
            message: message.into(),
            severity,
        }));
    }

    /// Emit a card mounted event
    fn emit_task_registered(
        &self,
        task_id: impl Into<String>,
        task_type: TaskType,
        metadata: serde_json::Value,
    ) {
        self.emit(AppEvent::Task(TaskEvent::Registered {
            task_id: task_id.into(),
            task_type,
            title: task_type.title().to_string(),
            metadata,
        }));
    }

    /// Emit a state transition event
    fn emit_state_changed(&self, task_id: impl Into<String>, from: TaskState, to: TaskState) {
        self.emit(AppEvent::Task(TaskEvent::StateChanged {
            task_id: task_id.into(),
            from,
            to,
        }));
    }

    /// Emit a log line appended to a card
    fn emit_log_appended(&self, task_id: impl Into<String>, line: LogLine) {
        self.emit(AppEvent::Task(TaskEvent::LogAppended {
            task_id: task_id.into(),
            line,
        }));
    }

    /// Emit a card dismissal
    fn emit_dismissed(&self, task_id: impl Into<String>, state: TaskState, fade: Duration) {
        self.emit(AppEvent::Task(TaskEvent::Dismissed {
            task_id: task_id.into(),
            state,
            fade,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
