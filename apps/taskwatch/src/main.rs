#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! taskwatch - Watch long-running download tasks until they finish
//!
//! Thin CLI over the tracker crate: every card change arrives as an event
//! and is rendered here, the tracker itself never prints.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use taskwatch_config::Config;
use taskwatch_errors::TrackerError;
use taskwatch_events::EventReceiver;
use taskwatch_net::StatusClient;
use taskwatch_tracker::{EventHooks, Registration, Tracker, TrackerOptions};
use taskwatch_types::{ActiveView, OutputFormat, TaskType};
use tokio::select;
use tokio::sync::watch;
use tracing::{error, info, warn};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting taskwatch v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global)?;

    let json_output = cli.global.json || config.general.default_output == OutputFormat::Json;
    let renderer = OutputRenderer::new(json_output, config.general.color);
    let client = StatusClient::from_config(&config)?;

    match cli.command {
        Commands::Watch {
            task_ids,
            task_type,
            meta,
            view,
        } => {
            let metadata = parse_metadata(&meta)?;
            let mut handler = EventHandler::new(renderer.clone(), json_output, cli.global.debug);
            watch_tasks(
                &config,
                client,
                WatchRequest {
                    task_ids,
                    task_type,
                    metadata,
                    view,
                },
                &mut handler,
            )
            .await?;

            renderer.render_summary(&handler.outcomes())?;
            match handler.unsuccessful() {
                0 => {}
                failed => return Err(CliError::TasksFailed(failed)),
            }
        }
        Commands::Status { task_id } => {
            if task_id.trim().is_empty() {
                return Err(TrackerError::EmptyTaskId.into());
            }
            let payload = client.fetch_status(&task_id).await?;
            renderer.render_status(&task_id, &payload)?;
        }
    }

    info!("Command completed successfully");
    Ok(())
}

/// Arguments of a watch run
struct WatchRequest {
    task_ids: Vec<String>,
    task_type: TaskType,
    metadata: serde_json::Value,
    view: ActiveView,
}

/// Track every requested task until all have settled or the user interrupts
async fn watch_tasks(
    config: &Config,
    client: StatusClient,
    request: WatchRequest,
    handler: &mut EventHandler,
) -> Result<(), CliError> {
    let (event_sender, mut event_receiver) = taskwatch_events::channel();
    // the sender half stays alive for as long as the CLI wants this view
    let (_view_sender, view_receiver) = watch::channel(request.view);

    let tracker = Tracker::builder()
        .with_source(Arc::new(client))
        .with_hooks(Arc::new(EventHooks::new(event_sender.clone())))
        .with_event_sender(event_sender)
        .with_view(view_receiver)
        .with_options(TrackerOptions::from_config(config))
        .build()?;

    for task_id in &request.task_ids {
        match tracker.register(task_id, request.task_type, request.metadata.clone())? {
            Registration::Started => {}
            Registration::AlreadyTracked => warn!(task_id = %task_id, "task listed twice"),
        }
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, dismissing {} task(s)", tracker.len());
                tracker.unregister_all();
                break;
            }

            event = event_receiver.recv() => {
                let Some(event) = event else { break };
                handler.handle_event(event);
                if tracker.is_empty() {
                    break;
                }
                if tracker.all_settled() {
                    tracker.unregister_all();
                }
            }
        }
    }

    // pollers hold the last senders, the channel closes once they exit
    drop(tracker);
    drain_events(&mut event_receiver, handler).await;
    Ok(())
}

/// Render whatever the stopping pollers still emit
async fn drain_events(event_receiver: &mut EventReceiver, handler: &mut EventHandler) {
    let drain = async {
        while let Some(event) = event_receiver.recv().await {
            handler.handle_event(event);
        }
    };
    if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
        warn!("Gave up waiting for pollers to stop");
    }
}

/// Parse repeated `KEY=VALUE` flags into a metadata object
///
/// Values that parse as JSON keep their type, anything else is a string.
fn parse_metadata(entries: &[String]) -> Result<serde_json::Value, CliError> {
    let mut map = serde_json::Map::new();
    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(TrackerError::InvalidMetadata {
                entry: entry.clone(),
            }
            .into());
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(TrackerError::InvalidMetadata {
                entry: entry.clone(),
            }
            .into());
        }
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        map.insert(key.to_string(), value);
    }
    Ok(serde_json::Value::Object(map))
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if json_mode {
        // JSON mode: keep stdout clean for the event stream
        if debug_enabled {
            if let Some(file) = create_log_file() {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new("info,taskwatch=debug"),
                        ),
                    )
                    .init();
                return;
            }
        }
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::logs_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!("Warning: Failed to create log directory: {e}");
        }

        let log_file = log_dir.join(format!(
            "taskwatch-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new("info,taskwatch=debug"),
                        ),
                    )
                    .init();

                eprintln!("Debug logging enabled: {}", log_file.display());
            }
            Err(e) => {
                eprintln!("Warning: Failed to create log file: {e}");
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                    )
                    .init();
            }
        }
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}

fn create_log_file() -> Option<std::fs::File> {
    let log_dir = Config::logs_dir();
    std::fs::create_dir_all(&log_dir).ok()?;
    let log_file = log_dir.join(format!(
        "taskwatch-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    std::fs::File::create(log_file).ok()
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) -> Result<(), CliError> {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if let Some(base_url) = &global.base_url {
        config.server.base_url.clone_from(base_url);
    }
    if let Some(status_path) = &global.status_path {
        config.server.status_path.clone_from(status_path);
    }
    if let Some(interval) = global.interval_ms {
        config.tracker.poll_interval_ms = interval;
    }
    if let Some(max_polls) = global.max_polls {
        config.tracker.max_polls = max_polls;
    }
    if global.json {
        config.general.default_output = OutputFormat::Json;
    }

    config.validate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_keeps_json_types() {
        let entries = vec![
            "total_urls=5".to_string(),
            "source=web".to_string(),
            "flags={\"hd\":true}".to_string(),
        ];
        let metadata = parse_metadata(&entries).unwrap();
        assert_eq!(metadata["total_urls"], 5);
        assert_eq!(metadata["source"], "web");
        assert_eq!(metadata["flags"]["hd"], true);
    }

    #[test]
    fn test_metadata_rejects_missing_separator() {
        let entries = vec!["total_urls".to_string()];
        assert!(matches!(
            parse_metadata(&entries),
            Err(CliError::Ops(_))
        ));
    }

    #[test]
    fn test_cli_flags_override_config() {
        let mut config = Config::default();
        let global = GlobalArgs {
            json: false,
            debug: false,
            color: None,
            config: None,
            base_url: Some("http://127.0.0.1:9000".to_string()),
            status_path: None,
            interval_ms: Some(250),
            max_polls: Some(3),
        };
        apply_cli_config(&mut config, &global).unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.tracker.poll_interval_ms, 250);
        assert_eq!(config.tracker.max_polls, 3);
    }

    #[test]
    fn test_invalid_cli_override_is_rejected() {
        let mut config = Config::default();
        let global = GlobalArgs {
            json: false,
            debug: false,
            color: None,
            config: None,
            base_url: None,
            status_path: Some("/status".to_string()),
            interval_ms: None,
            max_polls: None,
        };
        assert!(apply_cli_config(&mut config, &global).is_err());
    }
}
