//! Chat-completion API integration.
//!
//! The assistant talks to any `OpenAI`-compatible `chat/completions`
//! endpoint (Groq by default). Calls are single-shot: no streaming, no tool
//! use and no retries. Callers that must always produce a reply use
//! [`CompletionClient::complete_or_fallback`], which turns every failure
//! into one of the fixed notices below.

mod client;
mod error;
mod types;

pub use client::{
    CompletionClient, EMPTY_COMPLETION_REPLY, TRANSIENT_FAILURE_REPLY, UNAVAILABLE_REPLY,
    fallback_reply,
};
pub use error::{ApiErrorResponse, LlmError};
pub use types::{ChatMessage, Choice, ChoiceMessage, CompletionRequest, CompletionResponse, Role};
