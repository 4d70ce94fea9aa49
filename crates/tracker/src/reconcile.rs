//! Maps one status response onto a task and its card
//!
//! Reconciliation performs no I/O and never fails. Missing or malformed
//! fields degrade to defaults; the caller turns the returned
//! [`Reconciliation`] into events and hook calls.

use taskwatch_types::{
    BatchItem, CardStyle, LogLine, RemoteState, Severity, StatusPayload, TaskResult, TaskState,
    VideoEntry,
};

use crate::card::TaskCard;
use crate::task::TrackedTask;

pub const DEFAULT_STATUS: &str = "Processing...";
pub const SUCCESS_STATUS: &str = "Completed successfully!";
pub const FAILURE_STATUS: &str = "Processing failed";
pub const TIMEOUT_STATUS: &str = "Timed out";
pub const UNKNOWN_ERROR: &str = "unknown error";

const BATCH_STAGE: &str = "batch_processing";
const DOWNLOAD_STAGE: &str = "downloading";

/// What applying a response changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub transition: Option<(TaskState, TaskState)>,
    /// Lines appended to the card, in order
    pub logs: Vec<LogLine>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Still running, keep polling
    Continue,
    Succeeded,
    Failed { reason: String },
}

/// Apply one status response to a non-terminal task
pub fn reconcile(
    task: &mut TrackedTask,
    card: &mut TaskCard,
    payload: &StatusPayload,
) -> Reconciliation {
    let mut logs = Vec::new();

    task.progress = payload.progress.unwrap_or(0);
    if payload.stage.is_some() {
        task.stage.clone_from(&payload.stage);
    }
    card.set_progress(task.progress);

    card.status_message = non_empty(payload.message.as_deref())
        .unwrap_or(DEFAULT_STATUS)
        .to_string();
    if let Some(detail) = detail_text(payload) {
        card.detail = detail;
    }

    if let Some(url) = non_empty(payload.current_url.as_deref()) {
        logs.push(card.push_log(Severity::Info, format!("Processing: {url}")));
    }
    if let Some(title) = non_empty(payload.current_title.as_deref()) {
        logs.push(card.push_log(Severity::Info, format!("Downloading: {title}")));
    }

    let remote = payload.remote_state();
    let target = remote.task_state().unwrap_or(task.state);
    let transition = advance(task, target);

    let verdict = match remote {
        RemoteState::Success => {
            card.style = CardStyle::Succeeded;
            card.status_message = SUCCESS_STATUS.to_string();
            card.set_progress(100);
            for (severity, message) in success_summary(&payload.task_result()) {
                logs.push(card.push_log(severity, message));
            }
            Verdict::Succeeded
        }
        RemoteState::Failure => {
            let reason = payload.failure_reason().unwrap_or(UNKNOWN_ERROR).to_string();
            card.style = CardStyle::Failed;
            card.status_message = FAILURE_STATUS.to_string();
            logs.push(card.push_log(Severity::Error, reason.clone()));
            Verdict::Failed { reason }
        }
        RemoteState::Pending | RemoteState::Progress | RemoteState::Other(_) => Verdict::Continue,
    };

    Reconciliation {
        transition,
        logs,
        verdict,
    }
}

/// Move the task forward; backward or sideways moves are ignored
fn advance(task: &mut TrackedTask, target: TaskState) -> Option<(TaskState, TaskState)> {
    let rank = |state: TaskState| match state {
        TaskState::Pending => 0,
        TaskState::Progress => 1,
        _ => 2,
    };
    if task.state.is_terminal() || rank(target) <= rank(task.state) {
        return None;
    }
    let from = task.state;
    task.state = target;
    Some((from, target))
}

/// Per-category detail text, if the response's stage carries one
fn detail_text(payload: &StatusPayload) -> Option<String> {
    match payload.stage.as_deref() {
        Some(BATCH_STAGE) => Some(format!(
            "{}/{} URLs",
            payload.completed.unwrap_or(0),
            payload.total_urls.unwrap_or(0)
        )),
        Some(DOWNLOAD_STAGE) => match payload.total_videos {
            Some(total) if total != 0 => Some(format!(
                "{}/{} videos",
                payload.completed_videos.unwrap_or(0),
                total
            )),
            _ => None,
        },
        _ => None,
    }
}

/// Log lines summarising a finished task's result
fn success_summary(result: &TaskResult) -> Vec<(Severity, String)> {
    match result {
        TaskResult::Playlist { videos } => {
            let mut lines = vec![(
                Severity::Info,
                format!("Playlist processed: {} videos", videos.len()),
            )];
            lines.extend(
                videos
                    .iter()
                    .enumerate()
                    .map(|(i, video)| (Severity::Success, video_line(i + 1, video))),
            );
            lines
        }
        TaskResult::Batch {
            total_urls,
            completed,
            failed,
            items,
        } => {
            let total = total_urls.unwrap_or_else(|| i64::try_from(items.len()).unwrap_or(0));
            let completed = completed.unwrap_or_else(|| count_completed(items));
            let mut lines = vec![(
                Severity::Success,
                format!("Batch finished: {completed}/{total} URLs downloaded"),
            )];
            let failed = failed.unwrap_or(0);
            if failed > 0 {
                lines.push((Severity::Warning, format!("{failed} URLs failed")));
            }
            lines
        }
        TaskResult::Single {
            title,
            download_url,
            ..
        } => {
            let mut lines = vec![match non_empty(download_url.as_deref()) {
                Some(url) => (Severity::Success, format!("Download ready: {url}")),
                None => (
                    Severity::Info,
                    "Download finished, no download link available".to_string(),
                ),
            }];
            if let Some(title) = non_empty(title.as_deref()) {
                lines.push((Severity::Info, format!("Title: {title}")));
            }
            lines
        }
        TaskResult::Unknown => vec![(Severity::Success, "Task completed".to_string())],
    }
}

fn video_line(index: usize, video: &VideoEntry) -> String {
    let title = non_empty(video.title.as_deref()).unwrap_or("Untitled");
    match non_empty(video.download_url.as_deref()) {
        Some(url) => format!("{index}. {title} ({url})"),
        None => format!("{index}. {title}"),
    }
}

fn count_completed(items: &[BatchItem]) -> i64 {
    let done = items
        .iter()
        .filter(|item| matches!(item.status.as_deref(), Some("success" | "completed")))
        .count();
    i64::try_from(done).unwrap_or(0)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
