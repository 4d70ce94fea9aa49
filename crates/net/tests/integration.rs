//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use std::time::Duration;
    use taskwatch_errors::{Error, NetworkError, UserFacingError};
    use taskwatch_net::*;
    use taskwatch_types::{RemoteState, TaskResult};

    fn client_for(base_url: &str, status_path: &str) -> StatusClient {
        StatusClient::new(NetConfig {
            base_url: base_url.to_string(),
            status_path: status_path.to_string(),
            timeout: Duration::from_secs(5),
            ..NetConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_status_url_encodes_task_id() {
        let client = client_for("http://localhost:8000", "/admin/tasks/{task_id}/status");
        let url = client.status_url("a b/c").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/admin/tasks/a%20b%2Fc/status"
        );
    }

    #[test]
    fn test_status_url_keeps_base_prefix() {
        let client = client_for("http://example.com/svc/", "/api/tasks/{task_id}");
        let url = client.status_url("t-1").unwrap();
        assert_eq!(url.as_str(), "http://example.com/svc/api/tasks/t-1");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = StatusClient::new(NetConfig {
            base_url: "not a url".into(),
            ..NetConfig::default()
        });
        assert!(matches!(
            result,
            Err(Error::Network(NetworkError::InvalidUrl(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_admin_status() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/admin/tasks/abc/status")
                    .header("accept", "application/json");
                then.status(200).json_body(serde_json::json!({
                    "state": "PROGRESS",
                    "progress": 40,
                    "stage": "batch_processing",
                    "completed": 2,
                    "total_urls": 5
                }));
            })
            .await;

        let client = client_for(&server.base_url(), "/admin/tasks/{task_id}/status");
        let payload = client.fetch_status("abc").await.unwrap();

        mock.assert_async().await;
        assert_eq!(payload.remote_state(), RemoteState::Progress);
        assert_eq!(payload.progress, Some(40));
        assert_eq!(payload.completed, Some(2));
        assert_eq!(payload.total_urls, Some(5));
    }

    #[tokio::test]
    async fn test_fetch_public_status_through_trait() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tasks/xyz");
                then.status(200).json_body(serde_json::json!({
                    "status": "completed",
                    "result": {"title": "Clip", "download_url": "/downloads/clip.mp4"}
                }));
            })
            .await;

        let client = client_for(&server.base_url(), "/api/tasks/{task_id}");
        let source: std::sync::Arc<dyn StatusSource> = std::sync::Arc::new(client);
        let payload = source.fetch_status("xyz").await.unwrap();

        assert_eq!(payload.remote_state(), RemoteState::Success);
        match payload.task_result() {
            TaskResult::Single {
                title,
                download_url,
                ..
            } => {
                assert_eq!(title.as_deref(), Some("Clip"));
                assert_eq!(download_url.as_deref(), Some("/downloads/clip.mp4"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/admin/tasks/abc/status");
                then.status(502);
            })
            .await;

        let client = client_for(&server.base_url(), "/admin/tasks/{task_id}/status");
        let err = client.fetch_status("abc").await.unwrap_err();

        match &err {
            Error::Network(NetworkError::HttpError { status, message }) => {
                assert_eq!(*status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_rate_limited_with_retry_after() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/admin/tasks/abc/status");
                then.status(429).header("retry-after", "7");
            })
            .await;

        let client = client_for(&server.base_url(), "/admin/tasks/{task_id}/status");
        let err = client.fetch_status("abc").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::RateLimited { seconds: 7 })
        ));
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/admin/tasks/abc/status");
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let client = client_for(&server.base_url(), "/admin/tasks/{task_id}/status");
        let err = client.fetch_status("abc").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_retryable() {
        // Port 9 (discard) is closed on test machines
        let client = client_for("http://127.0.0.1:9", "/admin/tasks/{task_id}/status");
        let err = client.fetch_status("abc").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Network(
                NetworkError::ConnectionRefused(_)
                    | NetworkError::Timeout { .. }
                    | NetworkError::RequestFailed(_)
            )
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_backoff_from_config() {
        let config = taskwatch_config::NetworkConfig::default();
        let policy = BackoffPolicy::from_config(&config).without_jitter();
        assert_eq!(policy.delay(1), Duration::from_millis(2000));
        assert_eq!(policy.delay(3), Duration::from_millis(8000));
        assert_eq!(policy.delay(10), Duration::from_millis(30_000));
    }
}
