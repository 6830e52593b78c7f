//! Business logic services.

pub mod chat;

pub use chat::{ChatError, ChatService, ChatTurn, HISTORY_LIMIT, build_prompt};
