//! HTTP client for the chat-completions endpoint.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{instrument, warn};
use url::Url;

use crate::config::LlmConfig;

use super::error::{ApiErrorResponse, LlmError};
use super::types::{ChatMessage, CompletionRequest, CompletionResponse};

/// Reply stored when no API key is configured.
pub const UNAVAILABLE_REPLY: &str = "I apologize, but I'm currently unable to process your request. Please ensure the AI service is properly configured.";

/// Reply stored when the provider could not be reached or returned an error.
pub const TRANSIENT_FAILURE_REPLY: &str =
    "I'm experiencing some technical difficulties. Please try again in a moment.";

/// Reply stored when the provider succeeded without any text.
pub const EMPTY_COMPLETION_REPLY: &str =
    "I'm sorry, I couldn't generate a response. Please try again.";

/// Default `Retry-After` when a 429 carries none.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Chat-completion API client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct CompletionClient {
    inner: Arc<CompletionClientInner>,
}

struct CompletionClientInner {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    api_url: Url,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl CompletionClient {
    /// Create a client from configuration.
    ///
    /// A missing API key is not an error here; every call then fails with
    /// [`LlmError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Http` if the underlying HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CompletionClientInner {
                client,
                api_key: config.api_key.clone(),
                api_url: config.api_url.clone(),
                model: config.model.clone(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            }),
        })
    }

    /// Whether an API key is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.api_key.is_some()
    }

    /// Model identifier sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    /// Request a completion for `messages` and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::NotConfigured` without a key, `LlmError::Http` on
    /// transport failure, `LlmError::Api`/`RateLimited` on non-2xx,
    /// `LlmError::Parse` on an unreadable body and
    /// `LlmError::EmptyCompletion` when no text came back.
    #[instrument(skip(self, messages), fields(model = %self.inner.model, messages = messages.len()))]
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.inner.api_key.as_ref().ok_or(LlmError::NotConfigured)?;

        let request = CompletionRequest {
            model: &self.inner.model,
            messages,
            max_tokens: self.inner.max_tokens,
            temperature: self.inner.temperature,
        };

        let response = self
            .inner
            .client
            .post(self.inner.api_url.clone())
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {e}")))?;

        parsed.into_text().ok_or(LlmError::EmptyCompletion)
    }

    /// Request a completion, substituting a fixed notice for any failure.
    ///
    /// Never fails; the failure is logged at `warn`.
    pub async fn complete_or_fallback(&self, messages: &[ChatMessage]) -> String {
        match self.complete(messages).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "chat completion failed, using fallback reply");
                fallback_reply(&err).to_owned()
            }
        }
    }
}

/// The notice stored in place of a reply for a given failure.
#[must_use]
pub const fn fallback_reply(err: &LlmError) -> &'static str {
    match err {
        LlmError::NotConfigured => UNAVAILABLE_REPLY,
        LlmError::EmptyCompletion => EMPTY_COMPLETION_REPLY,
        LlmError::Http(_)
        | LlmError::Api { .. }
        | LlmError::RateLimited(_)
        | LlmError::Parse(_) => TRANSIENT_FAILURE_REPLY,
    }
}

/// Turn a non-success response into an error, reading the provider's message
/// when the body carries one.
async fn handle_error_status(status: reqwest::StatusCode, response: reqwest::Response) -> LlmError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return LlmError::RateLimited(retry_after);
    }

    match response.text().await {
        Ok(body) => {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |api_error| api_error.error.message);
            LlmError::Api {
                status: status.as_u16(),
                message,
            }
        }
        Err(e) => LlmError::Http(e),
    }
}
