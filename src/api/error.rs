//! Error type shared by every API call

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the news API
///
/// `Clone` so that one deduplicated network result can be handed to every
/// caller that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("Network request failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body was not the JSON we expected
    #[error("Failed to parse API response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds an HTTP error from a status code and the raw response body
    ///
    /// Uses the `message` field of a JSON error body when there is one,
    /// otherwise falls back to `HTTP Error <status>`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|message| !message.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP Error {}", status));

        ApiError::Http { status, message }
    }

    /// Returns the HTTP status for `Http` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
