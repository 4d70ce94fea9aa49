//! Render model of a tracked task

use serde::Serialize;
use taskwatch_events::TaskEvent;
use taskwatch_types::{CardStyle, LogLine, Severity, TaskType};

/// Status line shown before the first response arrives
pub const INITIAL_STATUS: &str = "Starting...";

/// Everything a renderer needs to draw one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCard {
    pub title: String,
    pub status_message: String,
    progress: u8,
    pub detail: String,
    pub style: CardStyle,
    pub logs: Vec<LogLine>,
}

impl TaskCard {
    #[must_use]
    pub fn new(task_type: TaskType) -> Self {
        Self {
            title: task_type.title().to_string(),
            status_message: INITIAL_STATUS.to_string(),
            progress: 0,
            detail: String::new(),
            style: CardStyle::Active,
            logs: Vec::new(),
        }
    }

    /// Displayed progress, always within 0..=100
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn progress_text(&self) -> String {
        format!("{}%", self.progress)
    }

    /// Set the bar from a backend-reported percentage, clamping out-of-range values
    pub fn set_progress(&mut self, percent: i64) {
        self.progress = u8::try_from(percent.clamp(0, 100)).unwrap_or(100);
    }

    /// Append a log line and return a copy for the event stream
    pub fn push_log(&mut self, severity: Severity, message: impl Into<String>) -> LogLine {
        let line = LogLine::new(severity, message);
        self.logs.push(line.clone());
        line
    }

    /// Log lines of one severity
    pub fn logs_with(&self, severity: Severity) -> impl Iterator<Item = &LogLine> {
        self.logs.iter().filter(move |line| line.severity == severity)
    }

    pub(crate) fn update_event(&self, task_id: &str) -> TaskEvent {
        TaskEvent::CardUpdated {
            task_id: task_id.to_string(),
            progress: self.progress,
            status_message: self.status_message.clone(),
            detail: self.detail.clone(),
            style: self.style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_card() {
        let card = TaskCard::new(TaskType::Playlist);
        assert_eq!(card.title, "Playlist download");
        assert_eq!(card.status_message, "Starting...");
        assert_eq!(card.progress_text(), "0%");
        assert_eq!(card.style, CardStyle::Active);
    }

    #[test]
    fn test_progress_clamped() {
        let mut card = TaskCard::new(TaskType::Single);
        card.set_progress(140);
        assert_eq!(card.progress(), 100);
        card.set_progress(-5);
        assert_eq!(card.progress(), 0);
        card.set_progress(42);
        assert_eq!(card.progress_text(), "42%");
    }
}
