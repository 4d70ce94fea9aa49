//! Structured logging integration for events
//!
//! Converts tracker events into tracing records with structured fields so
//! debug log files carry the same information as the JSON event stream.

use taskwatch_events::{AppEvent, EventEnvelope, GeneralEvent, PollEvent, TaskEvent};
use tracing::{debug, error, info, trace, warn};

/// Log an event envelope at its level with structured fields
pub fn log_event_with_tracing(envelope: &EventEnvelope) {
    let event = &envelope.event;
    let meta = &envelope.meta;
    let level = meta.tracing_level();

    match event {
        AppEvent::Task(task_event) => match task_event {
            TaskEvent::Registered {
                task_id,
                task_type,
                metadata,
                ..
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    task_id = %task_id,
                    task_type = %task_type,
                    metadata = %metadata,
                    "Task registered"
                );
            }
            TaskEvent::StateChanged { task_id, from, to } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    task_id = %task_id,
                    from = %from,
                    to = %to,
                    "Task state changed"
                );
            }
            TaskEvent::CardUpdated {
                task_id,
                progress,
                status_message,
                detail,
                ..
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    task_id = %task_id,
                    progress = progress,
                    status = %status_message,
                    detail = %detail,
                    "Card updated"
                );
            }
            TaskEvent::LogAppended { task_id, line } => {
                if level == tracing::Level::ERROR {
                    error!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        task_id = %task_id,
                        severity = %line.severity,
                        line = %line.message,
                        "Task log"
                    );
                } else {
                    info!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        task_id = %task_id,
                        severity = %line.severity,
                        line = %line.message,
                        "Task log"
                    );
                }
            }
            TaskEvent::Dismissed {
                task_id,
                state,
                fade,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    task_id = %task_id,
                    state = %state,
                    fade = ?fade,
                    "Task dismissed"
                );
            }
        },

        AppEvent::Poll(poll_event) => match poll_event {
            PollEvent::NetworkError {
                task_id,
                seq,
                failure,
                consecutive_failures,
                retry_in,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    task_id = %task_id,
                    seq = seq,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    consecutive_failures = consecutive_failures,
                    retry_in = ?retry_in,
                    "Status poll failed"
                );
            }
            PollEvent::TimedOut { task_id, polls } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    task_id = %task_id,
                    polls = polls,
                    "Task timed out"
                );
            }
            _ => {
                trace!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    event = ?poll_event,
                    "Poll event"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Notification { message, severity } => match level {
                tracing::Level::ERROR => {
                    error!(source = meta.source.as_str(), event_id = %meta.event_id, severity = %severity, "{message}")
                }
                tracing::Level::WARN => {
                    warn!(source = meta.source.as_str(), event_id = %meta.event_id, severity = %severity, "{message}")
                }
                _ => {
                    info!(source = meta.source.as_str(), event_id = %meta.event_id, severity = %severity, "{message}")
                }
            },
            GeneralEvent::FileListingRefreshRequested { task_id } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    task_id = %task_id,
                    "File listing refresh requested"
                );
            }
        },
    }
}
