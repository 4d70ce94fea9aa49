use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskwatch_types::{CardStyle, LogLine, TaskState, TaskType};

/// Card lifecycle events, one stream per tracked task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskEvent {
    /// Card mounted, before any status response arrived
    Registered {
        task_id: String,
        task_type: TaskType,
        title: String,
        metadata: serde_json::Value,
    },

    StateChanged {
        task_id: String,
        from: TaskState,
        to: TaskState,
    },

    /// Progress bar, status line, detail text or style changed
    CardUpdated {
        task_id: String,
        /// Display value, already clamped to 0..=100
        progress: u8,
        status_message: String,
        detail: String,
        style: CardStyle,
    },

    LogAppended { task_id: String, line: LogLine },

    /// Card removed; `fade` is the exit animation the renderer should play
    Dismissed {
        task_id: String,
        state: TaskState,
        fade: Duration,
    },
}

impl TaskEvent {
    #[must_use]
    pub fn task_id(&self) -> &str {
        match self {
            Self::Registered { task_id, .. }
            | Self::StateChanged { task_id, .. }
            | Self::CardUpdated { task_id, .. }
            | Self::LogAppended { task_id, .. }
            | Self::Dismissed { task_id, .. } => task_id,
        }
    }
}
