//! Error types for the chat-completion client.

use thiserror::Error;

/// Errors that can occur when calling the chat-completion API.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key is configured.
    #[error("chat-completion API key is not configured")]
    NotConfigured,

    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error message, or the raw body when it isn't JSON.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The API succeeded but returned no message content.
    #[error("completion contained no content")]
    EmptyCompletion,
}

/// Error envelope returned by `OpenAI`-compatible providers.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Nested error details.
    pub error: ApiErrorDetail,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorDetail {
    /// Error message.
    pub message: String,
    /// Error type, when the provider sends one.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}
