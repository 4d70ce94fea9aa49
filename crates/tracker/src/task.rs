//! Client-side record of one backend job

use chrono::{DateTime, Utc};
use serde::Serialize;
use taskwatch_types::{TaskState, TaskType};
use uuid::Uuid;

use crate::card::TaskCard;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedTask {
    pub task_id: String,
    pub task_type: TaskType,
    pub state: TaskState,
    /// Backend-reported percentage, stored unclamped
    pub progress: i64,
    pub stage: Option<String>,
    /// Status queries issued so far
    pub poll_count: u32,
    pub metadata: serde_json::Value,
    pub registered_at: DateTime<Utc>,
    /// Distinguishes this registration from earlier ones of the same id
    pub session: Uuid,
    pub last_applied_seq: u64,
    /// Newest request that ended in a transport error
    pub last_failed_seq: u64,
    pub consecutive_failures: u32,
}

impl TrackedTask {
    #[must_use]
    pub fn new(task_id: impl Into<String>, task_type: TaskType, metadata: serde_json::Value) -> Self {
        Self {
            task_id: task_id.into(),
            task_type,
            state: TaskState::Pending,
            progress: 0,
            stage: None,
            poll_count: 0,
            metadata,
            registered_at: Utc::now(),
            session: Uuid::new_v4(),
            last_applied_seq: 0,
            last_failed_seq: 0,
            consecutive_failures: 0,
        }
    }
}

/// Point-in-time copy of a task and its card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub task: TrackedTask,
    pub card: TaskCard,
}

/// Outcome of [`crate::Tracker::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A new task was created and its polling loop spawned
    Started,
    /// The id was already tracked; nothing changed
    AlreadyTracked,
}
