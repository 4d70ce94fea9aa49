#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for taskwatch
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/taskwatch/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod core;

pub use crate::core::{GeneralConfig, NetworkConfig, ServerConfig, TrackerConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskwatch_errors::{ConfigError, Error};
use taskwatch_types::{ColorChoice, OutputFormat};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tracker: TrackerConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(constants::APP_DIR).join(constants::CONFIG_FILE))
    }

    /// Directory used for debug log files
    #[must_use]
    pub fn logs_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join(constants::APP_DIR)
            .join("logs")
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or holds values that fail validation.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    /// Merge `TASKWATCH_*` values supplied by `lookup`
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or fails validation.
    pub fn merge_vars<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(constants::ENV_BASE_URL) {
            self.server.base_url = url;
        }

        if let Some(path) = lookup(constants::ENV_STATUS_PATH) {
            self.server.status_path = path;
        }

        if let Some(interval) = lookup(constants::ENV_POLL_INTERVAL_MS) {
            self.tracker.poll_interval_ms = parse_var(constants::ENV_POLL_INTERVAL_MS, interval)?;
        }

        if let Some(polls) = lookup(constants::ENV_MAX_POLLS) {
            self.tracker.max_polls = parse_var(constants::ENV_MAX_POLLS, polls)?;
        }

        if let Some(output) = lookup(constants::ENV_OUTPUT) {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: constants::ENV_OUTPUT.to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        if let Some(color) = lookup(constants::ENV_COLOR) {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: constants::ENV_COLOR.to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        self.validate()
    }

    /// Reject values the tracker cannot run with
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tracker.poll_interval_ms == 0 {
            return Err(invalid("tracker.poll_interval_ms", "0"));
        }
        if self.tracker.max_polls == 0 {
            return Err(invalid("tracker.max_polls", "0"));
        }
        if !self
            .server
            .status_path
            .contains(constants::TASK_ID_PLACEHOLDER)
        {
            return Err(invalid("server.status_path", &self.server.status_path));
        }
        if self.server.base_url.trim().is_empty() {
            return Err(invalid("server.base_url", ""));
        }
        if !(self.network.backoff_multiplier.is_finite() && self.network.backoff_multiplier > 0.0)
        {
            return Err(invalid(
                "network.backoff_multiplier",
                &self.network.backoff_multiplier.to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.network.jitter_factor) {
            return Err(invalid(
                "network.jitter_factor",
                &self.network.jitter_factor.to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(field: &str, value: String) -> Result<T, Error> {
    value.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()
    })
}

fn invalid(field: &str, value: &str) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}
