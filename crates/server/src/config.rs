//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORECHAT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STORECHAT_HOST` - Bind address (default: 127.0.0.1)
//! - `STORECHAT_PORT` - Listen port (default: 5000)
//! - `STORECHAT_CORS_ORIGIN` - Allowed browser origin for the widget (default: any)
//! - `GROQ_API_KEY` (or `GROQ_API_KEY_ENV_VAR`) - Chat-completion API key; AI replies degrade to a notice without it
//! - `LLM_API_URL` - Chat-completion endpoint (default: Groq `OpenAI`-compatible API)
//! - `LLM_MODEL` - Model identifier (default: llama-3.3-70b-versatile)
//! - `LLM_MAX_TOKENS` - Token cap per reply (default: 1000)
//! - `LLM_TEMPERATURE` - Sampling temperature, 0.0-2.0 (default: 0.7)
//! - `LLM_TIMEOUT_SECS` - Request timeout (default: 30)
//! - `CHAT_PRODUCT_CONTEXT` - Add matching products to the prompt (default: false)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origin; `None` allows any origin
    pub cors_origin: Option<String>,
    /// Chat-completion provider configuration
    pub llm: LlmConfig,
    /// Whether matching products are injected into the prompt
    pub product_context: bool,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Chat-completion API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct LlmConfig {
    /// API key; `None` means the assistant is not configured
    pub api_key: Option<SecretString>,
    /// Full URL of the chat-completions endpoint
    pub api_url: Url,
    /// Model identifier sent with every request
    pub model: String,
    /// Maximum tokens generated per reply
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url.as_str())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    /// Configuration for an assistant with no API key.
    ///
    /// Every reply degrades to the "not configured" notice.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: DEFAULT_LLM_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    fn from_lookup(env: &Env<'_>) -> Result<Self, ConfigError> {
        let api_key = ["GROQ_API_KEY", "GROQ_API_KEY_ENV_VAR"]
            .into_iter()
            .filter_map(|name| env.optional(name))
            .find(|key| !key.trim().is_empty())
            .map(SecretString::from);

        let api_url = match env.optional("LLM_API_URL") {
            Some(raw) => Url::parse(&raw)
                .map_err(|e| ConfigError::InvalidEnvVar("LLM_API_URL".to_owned(), e.to_string()))?,
            None => default_api_url(),
        };

        let temperature: f32 = env.parsed("LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidEnvVar(
                "LLM_TEMPERATURE".to_owned(),
                format!("must be between 0.0 and 2.0 (got {temperature})"),
            ));
        }

        let max_tokens: u32 = env.parsed("LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        if max_tokens == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "LLM_MAX_TOKENS".to_owned(),
                "must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_key,
            api_url,
            model: env.or_default("LLM_MODEL", DEFAULT_LLM_MODEL),
            max_tokens,
            temperature,
            timeout: Duration::from_secs(env.parsed("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let lookup = |key: &str| std::env::var(key).ok();
        Self::from_lookup(&lookup)
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let database_url = env
            .optional("STORECHAT_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STORECHAT_DATABASE_URL".to_owned()))?;

        let host: IpAddr = env.parsed("STORECHAT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port: u16 = env.parsed("STORECHAT_PORT", 5000)?;

        let log_format = match env.or_default("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_owned(),
                    format!("expected `text` or `json`, got `{other}`"),
                ));
            }
        };

        Ok(Self {
            database_url,
            host,
            port,
            cors_origin: env.optional("STORECHAT_CORS_ORIGIN"),
            llm: LlmConfig::from_lookup(&env)?,
            product_context: env.parsed("CHAT_PRODUCT_CONTEXT", false)?,
            log_format,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parsed("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn default_api_url() -> Url {
    #[allow(clippy::expect_used)] // constant URL, covered by tests
    Url::parse(DEFAULT_LLM_API_URL).expect("default LLM API URL is valid")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Thin wrapper over a key lookup with typed accessors.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_owned())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
        })
    }
}
