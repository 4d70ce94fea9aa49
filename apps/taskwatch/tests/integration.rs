//! Integration tests for the taskwatch CLI

use httpmock::prelude::*;
use serde_json::json;
use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

/// Empty config file so the host's own config never leaks into a test
fn empty_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# defaults only").unwrap();
    file
}

fn taskwatch(config: &NamedTempFile, server: &MockServer, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskwatch"))
        .arg("--config")
        .arg(config.path())
        .args(["--base-url", &server.base_url()])
        .args(["--color", "never", "--interval-ms", "20"])
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("TASKWATCH_BASE_URL")
        .env_remove("TASKWATCH_STATUS_PATH")
        .env_remove("TASKWATCH_POLL_INTERVAL_MS")
        .env_remove("TASKWATCH_MAX_POLLS")
        .env_remove("TASKWATCH_OUTPUT")
        .env_remove("TASKWATCH_COLOR")
        .output()
        .expect("Failed to execute taskwatch")
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_taskwatch"))
        .arg("--version")
        .output()
        .expect("Failed to execute taskwatch");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("taskwatch"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_taskwatch"))
        .arg("--help")
        .output()
        .expect("Failed to execute taskwatch");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Watch long-running download tasks"));
    assert!(stdout.contains("watch"));
    assert!(stdout.contains("status"));
}

#[test]
fn test_cli_invalid_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_taskwatch"))
        .arg("invalid-command")
        .output()
        .expect("Failed to execute taskwatch");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_watch_requires_task_ids() {
    let output = Command::new(env!("CARGO_BIN_EXE_taskwatch"))
        .arg("watch")
        .output()
        .expect("Failed to execute taskwatch");

    assert!(!output.status.success());
}

#[test]
fn test_status_prints_reconciled_card() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/admin/tasks/job-1/status");
        then.status(200).json_body(json!({
            "state": "PROGRESS",
            "progress": 40,
            "stage": "batch_processing",
            "completed": 2,
            "total_urls": 5
        }));
    });

    let config = empty_config();
    let output = taskwatch(&config, &server, &["status", "job-1"]);

    mock.assert();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PROGRESS"));
    assert!(stdout.contains("40%"));
    assert!(stdout.contains("2/5 URLs"));
}

#[test]
fn test_status_json_output() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/admin/tasks/job-2/status");
        then.status(200)
            .json_body(json!({ "state": "SUCCESS", "result": { "file": "a.mp4" } }));
    });

    let config = empty_config();
    let output = taskwatch(&config, &server, &["--json", "status", "job-2"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["task_id"], "job-2");
    assert_eq!(value["status"]["state"], "SUCCESS");
}

#[test]
fn test_status_reports_http_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/admin/tasks/job-3/status");
        then.status(404);
    });

    let config = empty_config();
    let output = taskwatch(&config, &server, &["status", "job-3"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("Code:"));
}

#[test]
fn test_watch_exits_once_task_succeeds() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/admin/tasks/job-4/status");
        then.status(200).json_body(json!({
            "state": "SUCCESS",
            "result": { "file": "clip.mp4" }
        }));
    });

    let config = empty_config();
    let output = taskwatch(&config, &server, &["watch", "job-4"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Completed successfully!"));
    assert!(stdout.contains("SUCCESS"));
}

#[test]
fn test_watch_fails_when_task_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/admin/tasks/job-5/status");
        then.status(200)
            .json_body(json!({ "state": "FAILURE", "error": "disk full" }));
    });

    let config = empty_config();
    let output = taskwatch(&config, &server, &["watch", "job-5"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("disk full"));
    assert!(stdout.contains("FAILURE"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 task(s) did not complete successfully"));
}

#[test]
fn test_watch_times_out_after_max_polls() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/admin/tasks/job-6/status");
        then.status(200)
            .json_body(json!({ "state": "PROGRESS", "progress": 10 }));
    });

    let config = empty_config();
    let output = taskwatch(&config, &server, &["--max-polls", "2", "watch", "job-6"]);

    assert!(!output.status.success());
    mock.assert_hits(2);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TIMED_OUT"));
}

#[test]
fn test_watch_rejects_malformed_metadata() {
    let server = MockServer::start();
    let config = empty_config();
    let output = taskwatch(&config, &server, &["watch", "job-7", "--meta", "oops"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("KEY=VALUE"));
}
