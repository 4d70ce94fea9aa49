use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Polling diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PollEvent {
    /// Status query sent
    Issued {
        task_id: String,
        seq: u64,
        poll_count: u32,
    },

    /// Transport failure; polling continues after `retry_in`
    NetworkError {
        task_id: String,
        seq: u64,
        failure: FailureContext,
        consecutive_failures: u32,
        retry_in: Duration,
    },

    /// Response overtaken by a newer one and dropped
    StaleResponse {
        task_id: String,
        seq: u64,
        /// Newest sequence number already handled, applied or failed
        last_applied: u64,
    },

    /// Response for a task that is no longer tracked, dropped
    LateResponse { task_id: String, seq: u64 },

    /// Poll ceiling reached
    TimedOut { task_id: String, polls: u32 },
}

impl PollEvent {
    #[must_use]
    pub fn task_id(&self) -> &str {
        match self {
            Self::Issued { task_id, .. }
            | Self::NetworkError { task_id, .. }
            | Self::StaleResponse { task_id, .. }
            | Self::LateResponse { task_id, .. }
            | Self::TimedOut { task_id, .. } => task_id,
        }
    }
}
