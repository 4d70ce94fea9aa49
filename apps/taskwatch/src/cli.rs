//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskwatch_types::{ActiveView, ColorChoice, TaskType};

/// taskwatch - Watch long-running download tasks until they finish
#[derive(Parser)]
#[command(name = "taskwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Watch long-running download tasks until they finish")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output events and results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the taskwatch log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the download service
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Status path template, must contain {task_id}
    #[arg(long, global = true, value_name = "TEMPLATE")]
    pub status_path: Option<String>,

    /// Milliseconds between status polls
    #[arg(long, global = true, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Polls before a task is considered timed out
    #[arg(long, global = true, value_name = "N")]
    pub max_polls: Option<u32>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Track tasks until every one of them finishes
    #[command(alias = "w")]
    Watch {
        /// Task ids returned by the job submission
        #[arg(required = true)]
        task_ids: Vec<String>,

        /// Job category, used for the card title
        #[arg(long = "type", value_enum, default_value = "single")]
        task_type: TaskType,

        /// Metadata attached to each card (KEY=VALUE, repeatable)
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,

        /// Dashboard view the tracker should assume is on screen
        #[arg(long, value_parser = parse_view, default_value = "dashboard")]
        view: ActiveView,
    },

    /// Query the status of one task once
    Status {
        /// Task id to query
        task_id: String,
    },
}

fn parse_view(value: &str) -> Result<ActiveView, String> {
    match value.to_ascii_lowercase().as_str() {
        "dashboard" => Ok(ActiveView::Dashboard),
        "files" => Ok(ActiveView::Files),
        "batches" => Ok(ActiveView::Batches),
        "other" => Ok(ActiveView::Other),
        _ => Err(format!(
            "unknown view '{value}': expected dashboard, files, batches or other"
        )),
    }
}
