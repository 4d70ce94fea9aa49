//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetworkError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("rate limited: retry after {seconds} seconds")]
    RateLimited { seconds: u64 },
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::ConnectionRefused(_) => {
                Some("Check that the download service is running and reachable.")
            }
            Self::InvalidUrl(_) => Some("Fix the base URL or status path in the configuration."),
            Self::HttpError { status: 404, .. } => {
                Some("The task id is unknown to the server or the status path is wrong.")
            }
            Self::RateLimited { .. } => Some("Wait before polling again or raise the interval."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. }
            | Self::RequestFailed(_)
            | Self::ConnectionRefused(_)
            | Self::MalformedResponse { .. }
            | Self::RateLimited { .. } => true,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidUrl(_) => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Timeout { .. } => "network.timeout",
            Self::RequestFailed(_) => "network.request_failed",
            Self::ConnectionRefused(_) => "network.connection_refused",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::HttpError { .. } => "network.http_error",
            Self::MalformedResponse { .. } => "network.malformed_response",
            Self::RateLimited { .. } => "network.rate_limited",
        })
    }
}
