//! Database operations for chat messages.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storechat_core::{ConversationId, MessageId, Sender};

use super::RepositoryError;
use crate::models::Message;

/// Internal row type for `PostgreSQL` message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    content: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: MessageId::from_uuid(row.id),
            conversation_id: ConversationId::from_uuid(row.conversation_id),
            content: row.content,
            sender: row.sender,
            timestamp: row.timestamp,
        }
    }
}

/// Repository for message database operations.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append a message to a conversation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        conversation_id: ConversationId,
        content: &str,
        sender: Sender,
    ) -> Result<Message, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r"
            INSERT INTO messages (conversation_id, content, sender)
            VALUES ($1, $2, $3)
            RETURNING id, conversation_id, content, sender, timestamp
            ",
        )
        .bind(conversation_id)
        .bind(content)
        .bind(sender)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get all messages for a conversation.
    ///
    /// Returns messages oldest first; rows stored in the same clock tick keep
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r"
            SELECT id, conversation_id, content, sender, timestamp
            FROM messages
            WHERE conversation_id = $1
            ORDER BY timestamp ASC, seq ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
