//! Chat message domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storechat_core::{ConversationId, MessageId, Sender};

/// A single message in a conversation. Messages are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message ID.
    pub id: MessageId,
    /// Conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// Message text.
    pub content: String,
    /// Who wrote the message.
    pub sender: Sender,
    /// When the message was stored; defines ordering within a conversation.
    pub timestamp: DateTime<Utc>,
}
