//! The conversation store seam.
//!
//! [`ChatStore`] is the full set of persistence operations the chat service
//! and routes need. [`PgStore`] implements it over the `PostgreSQL`
//! repositories; [`super::MemoryStore`] implements it in process.

use async_trait::async_trait;
use sqlx::PgPool;

use storechat_core::{ConversationId, Email, ProductId, Sender, UserId};

use super::{
    ConversationRepository, MessageRepository, ProductRepository, RepositoryError,
    StatsRepository, UserRepository,
};
use crate::models::{Conversation, Message, NewProduct, NewUser, Product, StoreStats, User};

/// Persistence operations for users, conversations, messages and products.
///
/// Every operation is a single-table read or write; nothing here spans a
/// transaction.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Row counts for every table.
    async fn stats(&self) -> Result<StoreStats, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Insert a user. Fails with `Conflict` on a duplicate email or username.
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// A user's conversations, most recently updated first.
    async fn list_conversations(&self, user_id: UserId)
    -> Result<Vec<Conversation>, RepositoryError>;

    async fn create_conversation(
        &self,
        user_id: UserId,
        title: &str,
    ) -> Result<Conversation, RepositoryError>;

    /// Rename a conversation; also refreshes `updated_at`.
    async fn update_conversation_title(
        &self,
        id: ConversationId,
        title: &str,
    ) -> Result<(), RepositoryError>;

    /// Refresh a conversation's `updated_at`.
    async fn touch_conversation(&self, id: ConversationId) -> Result<(), RepositoryError>;

    async fn create_message(
        &self,
        conversation_id: ConversationId,
        content: &str,
        sender: Sender,
    ) -> Result<Message, RepositoryError>;

    /// A conversation's messages in chronological order.
    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Up to `limit` products after skipping `offset`, in stock or not, in
    /// insertion order.
    async fn list_products(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// In-stock products whose name, description, category or brand contain
    /// `query`, ignoring case.
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RepositoryError>;

    async fn create_product(&self, product: NewProduct) -> Result<Product, RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ChatStore for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats, RepositoryError> {
        StatsRepository::new(&self.pool).counts().await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).get_by_id(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool)
            .get_by_username(username)
            .await
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).get_by_email(email).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        UserRepository::new(&self.pool).create(&user).await
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        ConversationRepository::new(&self.pool).get(id).await
    }

    async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        ConversationRepository::new(&self.pool)
            .list_for_user(user_id)
            .await
    }

    async fn create_conversation(
        &self,
        user_id: UserId,
        title: &str,
    ) -> Result<Conversation, RepositoryError> {
        ConversationRepository::new(&self.pool)
            .create(user_id, title)
            .await
    }

    async fn update_conversation_title(
        &self,
        id: ConversationId,
        title: &str,
    ) -> Result<(), RepositoryError> {
        ConversationRepository::new(&self.pool)
            .update_title(id, title)
            .await
    }

    async fn touch_conversation(&self, id: ConversationId) -> Result<(), RepositoryError> {
        ConversationRepository::new(&self.pool).touch(id).await
    }

    async fn create_message(
        &self,
        conversation_id: ConversationId,
        content: &str,
        sender: Sender,
    ) -> Result<Message, RepositoryError> {
        MessageRepository::new(&self.pool)
            .create(conversation_id, content, sender)
            .await
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        MessageRepository::new(&self.pool)
            .list_for_conversation(conversation_id)
            .await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get(id).await
    }

    async fn list_products(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Product>, RepositoryError> {
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        ProductRepository::new(&self.pool).list(offset, limit).await
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).search(query).await
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        ProductRepository::new(&self.pool).create(&product).await
    }
}
