//! Outward callbacks of the tracker

use taskwatch_events::{AppEvent, EventEmitter, EventSender, GeneralEvent};
use taskwatch_types::Severity;

/// Collaborators the tracker reaches out to on terminal outcomes
///
/// Both methods are called from the polling task, never while the tracker
/// holds a lock, so implementations may call back into the tracker.
pub trait TrackerHooks: Send + Sync {
    /// Surface a message outside the task's own card
    fn notify(&self, _message: &str, _severity: Severity) {}

    /// A download finished while the file listing is on screen
    fn refresh_file_listing(&self, _task_id: &str) {}
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl TrackerHooks for NoopHooks {}

/// Hooks that forward into the event channel
#[derive(Debug, Clone)]
pub struct EventHooks {
    tx: EventSender,
}

impl EventHooks {
    #[must_use]
    pub fn new(tx: EventSender) -> Self {
        Self { tx }
    }
}

impl EventEmitter for EventHooks {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

impl TrackerHooks for EventHooks {
    fn notify(&self, message: &str, severity: Severity) {
        self.emit_notification(message, severity);
    }

    fn refresh_file_listing(&self, task_id: &str) {
        self.emit(AppEvent::General(
            GeneralEvent::FileListingRefreshRequested {
                task_id: task_id.to_string(),
            },
        ));
    }
}
