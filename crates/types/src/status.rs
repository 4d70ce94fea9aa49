//! Status payload reported by the task-status endpoint
//!
//! Two dialects exist. The admin route reports `state` in upper case
//! (`PENDING`, `PROGRESS`, `SUCCESS`, `FAILURE`) next to the task's progress
//! meta. The public API route reports `status` in lower case (`pending`,
//! `processing`, `completed`, `failed`). Every field is optional and numeric
//! fields are read leniently: a value of the wrong shape becomes `None`
//! instead of failing the whole payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::result::TaskResult;
use crate::task::TaskState;

/// Backend state as reported by either dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteState {
    Pending,
    Progress,
    Success,
    Failure,
    /// Any other label, including a missing one
    Other(String),
}

impl RemoteState {
    /// Map a raw state label from either dialect
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "progress" | "processing" | "started" => Self::Progress,
            "success" | "completed" => Self::Success,
            "failure" | "failed" => Self::Failure,
            _ => Self::Other(label.to_string()),
        }
    }

    /// Client-side state this remote state maps onto, if any
    #[must_use]
    pub fn task_state(&self) -> Option<TaskState> {
        match self {
            Self::Pending => Some(TaskState::Pending),
            Self::Progress => Some(TaskState::Progress),
            Self::Success => Some(TaskState::Success),
            Self::Failure => Some(TaskState::Failure),
            Self::Other(_) => None,
        }
    }
}

/// One response from the status endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default, deserialize_with = "lenient::label")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient::label")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub progress: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub current_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub current_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub completed: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub failed: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub total_urls: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub completed_videos: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub total_videos: Option<i64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub error: Option<String>,
}

impl StatusPayload {
    /// Parse a raw response body
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Backend state, preferring the admin dialect's `state` field
    #[must_use]
    pub fn remote_state(&self) -> RemoteState {
        match self.state.as_deref().or(self.status.as_deref()) {
            Some(label) => RemoteState::parse(label),
            None => RemoteState::Other(String::new()),
        }
    }

    /// Typed view of the `result` field
    #[must_use]
    pub fn task_result(&self) -> TaskResult {
        self.result
            .as_ref()
            .map_or(TaskResult::Unknown, TaskResult::from_value)
    }

    /// Error text for a failed task: `error`, else `message`
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        non_empty(self.error.as_deref()).or_else(|| non_empty(self.message.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Convert a JSON value into an integer, accepting floats and numeric strings
#[must_use]
pub(crate) fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(round_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(round_f64))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_f64(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}

pub(crate) fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub(crate) mod lenient {
    use super::{int_from_value, text_from_value, Deserialize, Deserializer, Value};

    pub fn int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(int_from_value))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(text_from_value))
    }

    /// Only plain strings count as a state label
    pub fn label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
            Some(Value::String(s)) => matches!(s.as_str(), "true" | "1"),
            _ => false,
        })
    }
}
