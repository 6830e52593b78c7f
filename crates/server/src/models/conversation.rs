//! Conversation domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storechat_core::{ConversationId, UserId};

/// Number of leading words kept in a generated title.
const TITLE_WORDS: usize = 4;

/// Title used when the opening message has no words at all.
const FALLBACK_TITLE: &str = "New conversation";

/// A chat thread owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation ID.
    pub id: ConversationId,
    /// Owner of the conversation.
    pub user_id: UserId,
    /// Short title derived from the opening message.
    pub title: String,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// Refreshed every time a message pair is appended.
    pub updated_at: DateTime<Utc>,
}

/// Derive a conversation title from its opening message.
///
/// Keeps the first four whitespace-separated words and appends `...` when
/// the message had more.
///
/// ```
/// use storechat_server::models::conversation_title;
///
/// assert_eq!(conversation_title("Where is my order 123"), "Where is my order...");
/// assert_eq!(conversation_title("Hello there"), "Hello there");
/// ```
#[must_use]
pub fn conversation_title(message: &str) -> String {
    let mut words = message.split_whitespace();
    let head: Vec<&str> = words.by_ref().take(TITLE_WORDS).collect();

    if head.is_empty() {
        return FALLBACK_TITLE.to_owned();
    }

    let mut title = head.join(" ");
    if words.next().is_some() {
        title.push_str("...");
    }
    title
}
