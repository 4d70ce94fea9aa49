//! Event handling and terminal feedback

use std::collections::BTreeMap;

use taskwatch_events::{AppEvent, EventEnvelope, GeneralEvent, PollEvent, TaskEvent};
use taskwatch_types::{CardStyle, TaskState};

use crate::display::{OutputRenderer, TaskOutcome};
use crate::logging::log_event_with_tracing;

/// Last rendered state of one card
#[derive(Debug, Clone)]
struct CardView {
    title: String,
    state: TaskState,
    progress: u8,
    status_message: String,
    detail: String,
    style: CardStyle,
}

/// Event handler for card updates and user feedback
pub struct EventHandler {
    renderer: OutputRenderer,
    json_output: bool,
    debug_enabled: bool,
    cards: BTreeMap<String, CardView>,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(renderer: OutputRenderer, json_output: bool, debug_enabled: bool) -> Self {
        Self {
            renderer,
            json_output,
            debug_enabled,
            cards: BTreeMap::new(),
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        let envelope = EventEnvelope::from(event);
        log_event_with_tracing(&envelope);

        self.record(&envelope.event);

        if self.json_output {
            match serde_json::to_string(&envelope) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!("Failed to serialize event: {e}"),
            }
            return;
        }

        match &envelope.event {
            AppEvent::Task(event) => self.render_task_event(event),
            AppEvent::General(event) => self.render_general_event(event),
            AppEvent::Poll(event) => self.render_poll_event(event),
        }
    }

    /// Outcomes of every task seen so far, ordered by id
    pub fn outcomes(&self) -> Vec<TaskOutcome> {
        self.cards
            .iter()
            .map(|(task_id, view)| TaskOutcome {
                task_id: task_id.clone(),
                title: view.title.clone(),
                state: view.state,
                progress: view.progress,
                status_message: view.status_message.clone(),
            })
            .collect()
    }

    /// Tasks that ended without success
    pub fn unsuccessful(&self) -> usize {
        self.cards
            .values()
            .filter(|view| matches!(view.state, TaskState::Failure | TaskState::TimedOut))
            .count()
    }

    /// Keep the per-task view current, independent of output mode
    fn record(&mut self, event: &AppEvent) {
        let AppEvent::Task(event) = event else {
            return;
        };
        match event {
            TaskEvent::Registered { task_id, title, .. } => {
                self.cards.insert(
                    task_id.clone(),
                    CardView {
                        title: title.clone(),
                        state: TaskState::Pending,
                        progress: 0,
                        status_message: String::new(),
                        detail: String::new(),
                        style: CardStyle::Active,
                    },
                );
            }
            TaskEvent::StateChanged { task_id, to, .. } => {
                if let Some(view) = self.cards.get_mut(task_id) {
                    view.state = *to;
                }
            }
            TaskEvent::Dismissed { task_id, state, .. } => {
                if let Some(view) = self.cards.get_mut(task_id) {
                    view.state = *state;
                }
            }
            TaskEvent::CardUpdated { .. } | TaskEvent::LogAppended { .. } => {}
        }
    }

    fn render_task_event(&mut self, event: &TaskEvent) {
        match event {
            TaskEvent::Registered {
                task_id, title, ..
            } => {
                self.show_status(&format!("{title} {task_id}: tracking"));
            }
            TaskEvent::StateChanged { task_id, from, to } => {
                if self.debug_enabled {
                    self.show_status(&format!("{task_id}: {from} -> {to}"));
                }
            }
            TaskEvent::CardUpdated {
                task_id,
                progress,
                status_message,
                detail,
                style,
            } => {
                let Some(view) = self.cards.get_mut(task_id) else {
                    return;
                };
                let unchanged = view.progress == *progress
                    && view.status_message == *status_message
                    && view.detail == *detail
                    && view.style == *style;
                view.progress = *progress;
                view.status_message.clone_from(status_message);
                view.detail.clone_from(detail);
                view.style = *style;
                if unchanged {
                    return;
                }

                let mut line = format!("{task_id}: {progress:>3}% {status_message}");
                if !detail.is_empty() {
                    line.push_str(&format!(" ({detail})"));
                }
                let line = self.renderer.style_card(*style, &line);
                self.show_status(&line);
            }
            TaskEvent::LogAppended { task_id, line } => {
                let message = format!(
                    "{task_id}: {} {}",
                    line.timestamp.format("%H:%M:%S"),
                    line.message
                );
                self.show_status(&self.renderer.style_severity(line.severity, &message));
            }
            TaskEvent::Dismissed { task_id, state, .. } => {
                self.show_status(&format!("{task_id}: done ({state})"));
            }
        }
    }

    fn render_general_event(&self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Notification { message, severity } => {
                self.show_status(&self.renderer.style_severity(*severity, message));
            }
            GeneralEvent::FileListingRefreshRequested { task_id } => {
                if self.debug_enabled {
                    self.show_status(&format!("{task_id}: file listing refresh requested"));
                }
            }
        }
    }

    fn render_poll_event(&self, event: &PollEvent) {
        match event {
            PollEvent::NetworkError {
                task_id,
                failure,
                retry_in,
                ..
            } => {
                self.show_error(&format!(
                    "{task_id}: status check failed: {} (retrying in {:.1}s)",
                    failure.message,
                    retry_in.as_secs_f64()
                ));
            }
            PollEvent::Issued {
                task_id,
                poll_count,
                ..
            } => {
                if self.debug_enabled {
                    self.show_status(&format!("{task_id}: poll #{poll_count}"));
                }
            }
            PollEvent::StaleResponse {
                task_id,
                seq,
                last_applied,
            } => {
                if self.debug_enabled {
                    self.show_status(&format!(
                        "{task_id}: dropped stale response #{seq} (applied #{last_applied})"
                    ));
                }
            }
            PollEvent::LateResponse { .. } | PollEvent::TimedOut { .. } => {}
        }
    }

    /// Show status message
    fn show_status(&self, message: &str) {
        println!("{message}");
    }

    /// Show error message
    fn show_error(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskwatch_types::{ColorChoice, TaskType};

    fn handler() -> EventHandler {
        EventHandler::new(OutputRenderer::new(false, ColorChoice::Never), false, false)
    }

    #[test]
    fn test_outcomes_follow_state_changes() {
        let mut handler = handler();
        handler.handle_event(AppEvent::Task(TaskEvent::Registered {
            task_id: "b".to_string(),
            task_type: TaskType::Batch,
            title: "Batch download".to_string(),
            metadata: serde_json::Value::Null,
        }));
        handler.handle_event(AppEvent::Task(TaskEvent::Registered {
            task_id: "a".to_string(),
            task_type: TaskType::Single,
            title: "Download".to_string(),
            metadata: serde_json::Value::Null,
        }));
        handler.handle_event(AppEvent::Task(TaskEvent::StateChanged {
            task_id: "a".to_string(),
            from: TaskState::Pending,
            to: TaskState::Failure,
        }));
        handler.handle_event(AppEvent::Task(TaskEvent::CardUpdated {
            task_id: "b".to_string(),
            progress: 40,
            status_message: "Processing...".to_string(),
            detail: "2/5 URLs".to_string(),
            style: CardStyle::Active,
        }));

        let outcomes = handler.outcomes();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].task_id, "a");
        assert_eq!(outcomes[0].state, TaskState::Failure);
        assert_eq!(outcomes[1].title, "Batch download");
        assert_eq!(outcomes[1].progress, 40);
        assert_eq!(handler.unsuccessful(), 1);
    }

    #[test]
    fn test_updates_for_unknown_tasks_are_ignored() {
        let mut handler = handler();
        handler.handle_event(AppEvent::Task(TaskEvent::CardUpdated {
            task_id: "ghost".to_string(),
            progress: 10,
            status_message: "Processing...".to_string(),
            detail: String::new(),
            style: CardStyle::Active,
        }));
        assert!(handler.outcomes().is_empty());
    }
}
