//! Integration tests for events

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use taskwatch_events::*;
    use taskwatch_types::{CardStyle, LogLine, Severity, TaskState, TaskType};

    #[tokio::test]
    async fn test_event_sender_emitter() {
        let (tx, mut rx) = channel();

        tx.emit_notification("Task t1 completed", Severity::Success);
        tx.emit_state_changed("t1", TaskState::Progress, TaskState::Success);

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(
            event1,
            AppEvent::General(GeneralEvent::Notification {
                severity: Severity::Success,
                ..
            })
        ));

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::Task(TaskEvent::StateChanged {
                to: TaskState::Success,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_notification("ignored", Severity::Info);
        tx.emit_dismissed("t1", TaskState::Cancelled, Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_registered_uses_category_title() {
        let (tx, mut rx) = channel();
        tx.emit_task_registered("t1", TaskType::Batch, serde_json::json!({"urls": 5}));

        match rx.recv().await.unwrap() {
            AppEvent::Task(TaskEvent::Registered {
                task_id,
                task_type,
                title,
                metadata,
            }) => {
                assert_eq!(task_id, "t1");
                assert_eq!(task_type, TaskType::Batch);
                assert_eq!(title, "Batch download");
                assert_eq!(metadata["urls"], 5);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_task_id_routing() {
        let card = AppEvent::Task(TaskEvent::CardUpdated {
            task_id: "abc".into(),
            progress: 40,
            status_message: "Processing...".into(),
            detail: "2/5 URLs".into(),
            style: CardStyle::Active,
        });
        assert_eq!(card.task_id(), Some("abc"));
        assert_eq!(card.event_source(), EventSource::TASK);

        let refresh = AppEvent::General(GeneralEvent::FileListingRefreshRequested {
            task_id: "abc".into(),
        });
        assert_eq!(refresh.task_id(), Some("abc"));

        let note = AppEvent::General(GeneralEvent::Notification {
            message: "Task abc timed out after 60 polls".into(),
            severity: Severity::Warning,
        });
        assert_eq!(note.task_id(), None);
        assert_eq!(note.event_source(), EventSource::GENERAL);
        assert_eq!(note.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_log_levels() {
        let error_line = AppEvent::Task(TaskEvent::LogAppended {
            task_id: "t".into(),
            line: LogLine::new(Severity::Error, "boom"),
        });
        assert_eq!(error_line.log_level(), tracing::Level::ERROR);

        let info_line = AppEvent::Task(TaskEvent::LogAppended {
            task_id: "t".into(),
            line: LogLine::new(Severity::Info, "Processing: https://a"),
        });
        assert_eq!(info_line.log_level(), tracing::Level::INFO);

        let timed_out = AppEvent::Poll(PollEvent::TimedOut {
            task_id: "t".into(),
            polls: 60,
        });
        assert_eq!(timed_out.log_level(), tracing::Level::WARN);
        assert_eq!(timed_out.log_target(), "taskwatch::events::poll");

        let issued = AppEvent::Poll(PollEvent::Issued {
            task_id: "t".into(),
            seq: 1,
            poll_count: 1,
        });
        assert_eq!(issued.log_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_envelope_serialization() {
        let event = AppEvent::Task(TaskEvent::StateChanged {
            task_id: "t9".into(),
            from: TaskState::Pending,
            to: TaskState::Progress,
        });
        let envelope = EventEnvelope::from(event);
        assert_eq!(envelope.meta.correlation_id.as_deref(), Some("t9"));
        assert_eq!(envelope.meta.level, EventLevel::Info);
        assert_eq!(envelope.meta.source.as_str(), "task");

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["domain"], "task");
        assert_eq!(json["event"]["type"], "StateChanged");
        assert_eq!(json["event"]["to"], "PROGRESS");
        assert_eq!(json["meta"]["correlationId"], "t9");
    }

    #[test]
    fn test_failure_context_from_error() {
        let error = taskwatch_errors::NetworkError::HttpError {
            status: 503,
            message: "Service Unavailable".into(),
        };
        let failure = FailureContext::from_error(&error);
        assert!(failure.retryable);
        assert_eq!(failure.code.as_deref(), Some("network.http_error"));
    }
}
