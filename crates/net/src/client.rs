//! HTTP client for the task-status endpoint

use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use taskwatch_config::constants::TASK_ID_PLACEHOLDER;
use taskwatch_config::Config;
use taskwatch_errors::{Error, NetworkError};
use taskwatch_types::StatusPayload;
use url::Url;

/// Status client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub base_url: String,
    /// Path template containing `{task_id}`
    pub status_path: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl NetConfig {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.network.timeout);
        Self {
            base_url: config.server.base_url.clone(),
            status_path: config.server.status_path.clone(),
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(10)),
            pool_idle_timeout: Duration::from_secs(90),
            user_agent: format!("taskwatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Queries the download service for the status of one task
#[derive(Clone)]
pub struct StatusClient {
    client: Client,
    config: NetConfig,
}

impl StatusClient {
    /// Create a new status client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the underlying
    /// reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        crate::parse_url(&config.base_url)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from the application configuration
    ///
    /// # Errors
    ///
    /// Same as [`StatusClient::new`].
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(NetConfig::from_config(config))
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Build the status URL for a task
    ///
    /// Each path segment of the template is percent-encoded after the task
    /// id is substituted, so ids containing `/`, `?` or spaces stay inside
    /// their segment.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidUrl` if the base URL cannot carry a path.
    pub fn status_url(&self, task_id: &str) -> Result<Url, Error> {
        let mut url = crate::parse_url(&self.config.base_url)?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                NetworkError::InvalidUrl(format!(
                    "{} cannot be used as a base URL",
                    self.config.base_url
                ))
            })?;
            segments.pop_if_empty();
            for segment in self.config.status_path.split('/').filter(|s| !s.is_empty()) {
                segments.push(&segment.replace(TASK_ID_PLACEHOLDER, task_id));
            }
        }
        Ok(url)
    }

    /// Fetch and parse the status of a task
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError`: `Timeout` or `ConnectionRefused` for transport
    /// failures, `RateLimited`/`HttpError` for non-2xx answers and
    /// `MalformedResponse` when the body is not a JSON object.
    pub async fn fetch_status(&self, task_id: &str) -> Result<StatusPayload, Error> {
        let url = self.status_url(task_id)?;
        tracing::trace!(%url, "fetching task status");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(&e, &url))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(seconds) = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
            {
                return Err(NetworkError::RateLimited { seconds }.into());
            }
        }
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .map_or_else(|| status.to_string(), str::to_string),
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&e, &url))?;

        StatusPayload::from_slice(&body).map_err(|e| {
            NetworkError::MalformedResponse {
                message: e.to_string(),
            }
            .into()
        })
    }
}

fn transport_error(error: &reqwest::Error, url: &Url) -> Error {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else if error.is_connect() {
        NetworkError::ConnectionRefused(error.to_string()).into()
    } else {
        NetworkError::RequestFailed(error.to_string()).into()
    }
}
