#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for taskwatch
//!
//! This crate talks to the download service's task-status endpoint and
//! provides the backoff math used when that endpoint is unreachable.

mod backoff;
mod client;

pub use backoff::BackoffPolicy;
pub use client::{NetConfig, StatusClient};

use async_trait::async_trait;
use std::sync::Arc;
use taskwatch_errors::{Error, NetworkError};
use taskwatch_types::StatusPayload;
use url::Url;

/// Anything that can answer "what is the status of task X"
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Query the current status of a task
    ///
    /// # Errors
    ///
    /// Returns an error if the status could not be obtained or parsed.
    async fn fetch_status(&self, task_id: &str) -> Result<StatusPayload, Error>;
}

#[async_trait]
impl StatusSource for StatusClient {
    async fn fetch_status(&self, task_id: &str) -> Result<StatusPayload, Error> {
        StatusClient::fetch_status(self, task_id).await
    }
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    async fn fetch_status(&self, task_id: &str) -> Result<StatusPayload, Error> {
        (**self).fetch_status(task_id).await
    }
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url.trim()).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")).into())
}
