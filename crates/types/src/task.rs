//! Task categories and the client-side task state machine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taskwatch_errors::TrackerError;

/// Category of a backend job. Only affects how its card is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Single,
    Batch,
    Playlist,
}

impl TaskType {
    /// Card title shown for this category
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Single => "Download",
            Self::Batch => "Batch download",
            Self::Playlist => "Playlist download",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Batch => "batch",
            Self::Playlist => "playlist",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // the dashboard labels single jobs "download"
            "single" | "download" => Ok(Self::Single),
            "batch" => Ok(Self::Batch),
            "playlist" => Ok(Self::Playlist),
            _ => Err(TrackerError::UnknownTaskType {
                value: s.to_string(),
            }),
        }
    }
}

impl clap::ValueEnum for TaskType {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Single, Self::Batch, Self::Playlist]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Client-side state of a tracked task
///
/// Transitions only move toward a terminal state. `Cancelled` and `TimedOut`
/// are synthesized locally; the backend never reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    #[default]
    Pending,
    Progress,
    Success,
    Failure,
    Cancelled,
    TimedOut,
}

impl TaskState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failure | Self::Cancelled | Self::TimedOut
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Progress => "PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Cancelled => "CANCELLED",
            Self::TimedOut => "TIMED_OUT",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
