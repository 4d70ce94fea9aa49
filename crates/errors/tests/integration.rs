//! Integration tests for error types

#[cfg(test)]
mod tests {
    use taskwatch_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "http://localhost:8000/admin/tasks/abc/status".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = NetworkError::HttpError {
            status: 502,
            message: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "HTTP error 502: Bad Gateway");
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = NetworkError::HttpError {
            status: 404,
            message: "Not Found".into(),
        };
        assert!(!err.is_retryable());
        assert!(err.user_hint().is_some());
    }

    #[test]
    fn test_tracker_error_codes() {
        let err: Error = TrackerError::EmptyTaskId.into();
        assert_eq!(err.user_code(), Some("tracker.empty_task_id"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        match err {
            Error::Io { kind, message } => {
                assert_eq!(kind, "PermissionDenied");
                assert_eq!(message, "test");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
