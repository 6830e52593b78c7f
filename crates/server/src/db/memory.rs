//! In-process [`ChatStore`] used by tests and local development.
//!
//! Mirrors the `PostgreSQL` constraints that the handlers rely on: foreign
//! keys on conversations and messages, unique usernames and emails, and
//! clock timestamps that never run backwards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use storechat_core::{ConversationId, Email, MessageId, ProductId, Sender, UserId};

use super::{ChatStore, RepositoryError};
use crate::models::{Conversation, Message, NewProduct, NewUser, Product, StoreStats, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    products: Vec<Product>,
    last_tick: Option<DateTime<Utc>>,
}

/// Table length as a SQL-style count.
fn count<T>(rows: &[T]) -> i64 {
    i64::try_from(rows.len()).unwrap_or(i64::MAX)
}

impl Tables {
    /// Current time, clamped so it never precedes a previously issued one.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = self.last_tick.map_or(now, |last| now.max(last));
        self.last_tick = Some(now);
        now
    }

    fn conversation_mut(
        &mut self,
        id: ConversationId,
    ) -> Result<&mut Conversation, RepositoryError> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)
    }
}

/// A [`ChatStore`] backed by in-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(StoreStats {
            users: count(&tables.users),
            products: count(&tables.products),
            conversations: count(&tables.conversations),
            messages: count(&tables.messages),
        })
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| &u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(RepositoryError::Conflict("user already exists".to_owned()));
        }

        let user = User {
            id: UserId::new(),
            username: user.username,
            email: user.email,
            password: user.password,
            created_at: tables.tick(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut conversations: Vec<Conversation> = tables
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn create_conversation(
        &self,
        user_id: UserId,
        title: &str,
    ) -> Result<Conversation, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(RepositoryError::Conflict(format!(
                "user {user_id} does not exist"
            )));
        }

        let now = tables.tick();
        let conversation = Conversation {
            id: ConversationId::new(),
            user_id,
            title: title.to_owned(),
            created_at: now,
            updated_at: now,
        };
        tables.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn update_conversation_title(
        &self,
        id: ConversationId,
        title: &str,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let conversation = tables.conversation_mut(id)?;
        title.clone_into(&mut conversation.title);
        conversation.updated_at = now;
        Ok(())
    }

    async fn touch_conversation(&self, id: ConversationId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let conversation = tables.conversation_mut(id)?;
        conversation.updated_at = conversation.updated_at.max(now);
        Ok(())
    }

    async fn create_message(
        &self,
        conversation_id: ConversationId,
        content: &str,
        sender: Sender,
    ) -> Result<Message, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.conversations.iter().any(|c| c.id == conversation_id) {
            return Err(RepositoryError::Conflict(format!(
                "conversation {conversation_id} does not exist"
            )));
        }

        let message = Message {
            id: MessageId::new(),
            conversation_id,
            content: content.to_owned(),
            sender,
            timestamp: tables.tick(),
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let tables = self.tables.read().await;
        // Insertion order already agrees with the non-decreasing clock.
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;
        let mut products: Vec<Product> = tables
            .products
            .iter()
            .filter(|p| p.in_stock && p.matches(&needle))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.write().await;
        let product = Product {
            id: ProductId::new(),
            name: product.name,
            description: product.description,
            category: product.category,
            brand: product.brand,
            price: product.price,
            in_stock: product.in_stock,
            created_at: tables.tick(),
        };
        tables.products.push(product.clone());
        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser::demo(name, Email::parse(&format!("{name}@example.com")).unwrap())
    }

    fn new_product(name: &str, category: &str, in_stock: bool) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            category: Some(category.to_string()),
            brand: None,
            price: None,
            in_stock,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice")).await.unwrap();

        let duplicate = NewUser::demo("alice2", Email::parse("alice@example.com").unwrap());
        let err = store.create_user(duplicate).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_conversation_requires_existing_user() {
        let store = MemoryStore::new();
        let err = store
            .create_conversation(UserId::new(), "Hello")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_messages_listed_in_insertion_order() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("bob")).await.unwrap();
        let conversation = store.create_conversation(user.id, "Hi").await.unwrap();

        for (i, sender) in [Sender::User, Sender::Ai, Sender::User].into_iter().enumerate() {
            store
                .create_message(conversation.id, &format!("m{i}"), sender)
                .await
                .unwrap();
        }

        let messages = store.list_messages(conversation.id).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["m0", "m1", "m2"]);
        assert!(messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_conversations_newest_updated_first() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("carol")).await.unwrap();
        let older = store.create_conversation(user.id, "older").await.unwrap();
        let newer = store.create_conversation(user.id, "newer").await.unwrap();

        store.touch_conversation(older.id).await.unwrap();

        let listed = store.list_conversations(user.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].updated_at >= listed[1].updated_at);
        assert!(listed.iter().any(|c| c.id == newer.id));
    }

    #[tokio::test]
    async fn test_rename_conversation() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("dave")).await.unwrap();
        let conversation = store.create_conversation(user.id, "Draft").await.unwrap();

        store
            .update_conversation_title(conversation.id, "Order #123")
            .await
            .unwrap();

        let renamed = store
            .get_conversation(conversation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.title, "Order #123");
        assert!(renamed.updated_at >= conversation.updated_at);
        assert_eq!(renamed.created_at, conversation.created_at);

        let err = store
            .update_conversation_title(ConversationId::new(), "Nope")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_touch_unknown_conversation_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .touch_conversation(ConversationId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_search_skips_out_of_stock() {
        let store = MemoryStore::new();
        store
            .create_product(new_product("Running Shoe", "Footwear", true))
            .await
            .unwrap();
        store
            .create_product(new_product("Dress Shoe", "Footwear", false))
            .await
            .unwrap();
        store
            .create_product(new_product("Laptop", "Electronics", true))
            .await
            .unwrap();

        let found = store.search_products("SHOE").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Running Shoe");

        let all = store.list_products(0, 20).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_product_paging_and_lookup() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["A", "B", "C", "D"] {
            let product = store
                .create_product(new_product(name, "Misc", name != "C"))
                .await
                .unwrap();
            ids.push(product.id);
        }

        let page = store.list_products(1, 2).await.unwrap();
        let names: Vec<&str> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["B", "C"]);
        assert!(store.list_products(10, 5).await.unwrap().is_empty());

        let found = store.get_product(ids[3]).await.unwrap().unwrap();
        assert_eq!(found.name, "D");
        assert!(store.get_product(ProductId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_count_every_table() {
        let store = MemoryStore::new();
        assert_eq!(store.stats().await.unwrap(), StoreStats::default());

        let user = store.create_user(new_user("erin")).await.unwrap();
        let conversation = store.create_conversation(user.id, "Hi").await.unwrap();
        store
            .create_message(conversation.id, "hi", Sender::User)
            .await
            .unwrap();
        store
            .create_message(conversation.id, "hello", Sender::Ai)
            .await
            .unwrap();
        store
            .create_product(new_product("Lamp", "Home", true))
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(
            stats,
            StoreStats {
                users: 1,
                products: 1,
                conversations: 1,
                messages: 2,
            }
        );
    }
}
