//! Integration tests for config

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;
    use taskwatch_config::*;
    use taskwatch_types::{ColorChoice, OutputFormat};
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_output = "plain"
color = "never"

[server]
base_url = "https://media.example.com"
status_path = "/api/tasks/{{task_id}}"

[tracker]
poll_interval_ms = 3000
max_polls = 60

[network]
timeout = 10
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.server.base_url, "https://media.example.com");
        assert_eq!(config.server.status_path, "/api/tasks/{task_id}");
        assert_eq!(config.tracker.poll_interval_ms, 3000);
        assert_eq!(config.tracker.linger_secs, 10);
        assert_eq!(config.network.timeout, 10);
        assert!((config.network.backoff_multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = Config::load_from_file(std::path::Path::new("/nonexistent/taskwatch.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            taskwatch_errors::Error::Config(taskwatch_errors::ConfigError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_status_path_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[server]\nstatus_path = \"/admin/tasks/status\"").unwrap();

        assert!(Config::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.status_path, constants::ADMIN_STATUS_PATH);
        assert_eq!(config.tracker.poll_interval_ms, 2000);
        assert_eq!(config.tracker.max_polls, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_vars() {
        let env = vars(&[
            ("TASKWATCH_BASE_URL", "http://10.0.0.5:5000"),
            ("TASKWATCH_POLL_INTERVAL_MS", "3000"),
            ("TASKWATCH_MAX_POLLS", "20"),
            ("TASKWATCH_OUTPUT", "json"),
            ("TASKWATCH_COLOR", "always"),
        ]);

        let mut config = Config::default();
        config.merge_vars(|name| env.get(name).cloned()).unwrap();

        assert_eq!(config.server.base_url, "http://10.0.0.5:5000");
        assert_eq!(config.tracker.poll_interval_ms, 3000);
        assert_eq!(config.tracker.max_polls, 20);
        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.general.color, ColorChoice::Always);
    }

    #[test]
    fn test_invalid_var_values() {
        let mut config = Config::default();
        let env = vars(&[("TASKWATCH_MAX_POLLS", "lots")]);
        assert!(config.merge_vars(|name| env.get(name).cloned()).is_err());

        let mut config = Config::default();
        let env = vars(&[("TASKWATCH_POLL_INTERVAL_MS", "0")]);
        assert!(config.merge_vars(|name| env.get(name).cloned()).is_err());
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("TASKWATCH_OUTPUT");
        std::env::set_var("TASKWATCH_OUTPUT", "plain");

        let mut config = Config::default();
        config.merge_env().unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);

        std::env::remove_var("TASKWATCH_OUTPUT");
    }
}
