//! Chat service for orchestrating assistant conversations.
//!
//! One chat turn:
//! 1. Check the user exists and resolve (or open) the conversation
//! 2. Save the user message
//! 3. Convert recent history to prompt messages, roles taken from senders
//! 4. Call the chat-completion API, falling back to a fixed notice
//! 5. Save the assistant reply and bump the conversation

use askama::Template;
use tracing::{info, instrument, warn};

use storechat_core::{ConversationId, Sender, UserId};

use crate::db::{ChatStore, RepositoryError};
use crate::llm::{ChatMessage, CompletionClient};
use crate::models::{Conversation, Message, Product, conversation_title};

/// Number of stored messages replayed to the model before the new one.
pub const HISTORY_LIMIT: usize = 10;

/// Maximum number of products rendered into the prompt.
pub const PRODUCT_CONTEXT_LIMIT: usize = 5;

/// System prompt template for the storefront assistant.
#[derive(Template)]
#[template(path = "chat/system_prompt.txt")]
struct SystemPromptTemplate;

/// Matching products shown to the model after the user's message.
#[derive(Template)]
#[template(path = "chat/product_context.txt")]
struct ProductContextTemplate<'a> {
    products: &'a [Product],
}

/// Render the system prompt template.
fn render_system_prompt() -> String {
    // Static template with no variables.
    SystemPromptTemplate
        .render()
        .unwrap_or_else(|_| String::from("You are a helpful AI assistant for an e-commerce platform."))
}

/// Render the product context message, or `None` when there is nothing to show.
fn render_product_context(products: &[Product]) -> Option<String> {
    if products.is_empty() {
        return None;
    }

    match (ProductContextTemplate { products }).render() {
        Ok(text) => Some(text.trim_end().to_owned()),
        Err(e) => {
            warn!(error = %e, "failed to render product context");
            None
        }
    }
}

/// Errors that can occur in the chat service.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Database error.
    #[error("database error: {0}")]
    Store(#[from] RepositoryError),

    /// The sending user does not exist.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// The requested conversation does not exist (or belongs to someone else).
    #[error("conversation {0} not found")]
    ConversationNotFound(ConversationId),

    /// The message failed validation.
    #[error("{0}")]
    Validation(String),
}

/// Both messages stored by a chat turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub conversation_id: ConversationId,
    pub user_message: Message,
    pub ai_message: Message,
}

/// Build the prompt for one turn.
///
/// `history` is the conversation's prior messages, oldest first, not
/// including `user_text`. Only the last [`HISTORY_LIMIT`] are kept, and each
/// keeps the role of whoever actually sent it.
#[must_use]
pub fn build_prompt(
    system_prompt: &str,
    history: &[Message],
    user_text: &str,
    product_context: Option<String>,
) -> Vec<ChatMessage> {
    let window = history
        .get(history.len().saturating_sub(HISTORY_LIMIT)..)
        .unwrap_or_default();

    let mut prompt = Vec::with_capacity(window.len() + 3);
    prompt.push(ChatMessage::system(system_prompt));
    prompt.extend(window.iter().map(|m| ChatMessage {
        role: m.sender.into(),
        content: m.content.clone(),
    }));
    prompt.push(ChatMessage::user(user_text));

    if let Some(context) = product_context {
        prompt.push(ChatMessage::system(context));
    }

    prompt
}

/// Chat service for orchestrating assistant conversations.
pub struct ChatService<'a> {
    store: &'a dyn ChatStore,
    llm: &'a CompletionClient,
    product_context: bool,
}

impl<'a> ChatService<'a> {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(store: &'a dyn ChatStore, llm: &'a CompletionClient) -> Self {
        Self {
            store,
            llm,
            product_context: false,
        }
    }

    /// Inject matching in-stock products into each prompt.
    #[must_use]
    pub const fn with_product_context(mut self, enabled: bool) -> Self {
        self.product_context = enabled;
        self
    }

    /// Handle one user message end to end.
    ///
    /// The assistant reply is always stored: API failures become fixed
    /// notices instead of errors.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Validation` for a blank message,
    /// `ChatError::UserNotFound` / `ConversationNotFound` for unknown ids,
    /// and `ChatError::Store` if a database operation fails.
    #[instrument(skip(self, message), fields(user_id = %user_id, conversation_id))]
    pub async fn send_message(
        &self,
        user_id: UserId,
        message: &str,
        conversation_id: Option<ConversationId>,
    ) -> Result<ChatTurn, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::Validation("message must not be empty".to_owned()));
        }

        if self.store.get_user(user_id).await?.is_none() {
            return Err(ChatError::UserNotFound(user_id));
        }

        let conversation = self.resolve_conversation(user_id, message, conversation_id).await?;
        tracing::Span::current().record("conversation_id", tracing::field::display(conversation.id));

        let user_message = self
            .store
            .create_message(conversation.id, message, Sender::User)
            .await?;

        let history: Vec<Message> = self
            .store
            .list_messages(conversation.id)
            .await?
            .into_iter()
            .filter(|m| m.id != user_message.id)
            .collect();

        let product_context = if self.product_context {
            self.product_context_for(message).await
        } else {
            None
        };

        let prompt = build_prompt(&render_system_prompt(), &history, message, product_context);
        let reply = self.llm.complete_or_fallback(&prompt).await;

        let ai_message = self
            .store
            .create_message(conversation.id, &reply, Sender::Ai)
            .await?;
        self.store.touch_conversation(conversation.id).await?;

        info!(
            history = history.len().min(HISTORY_LIMIT),
            "chat turn stored"
        );

        Ok(ChatTurn {
            conversation_id: conversation.id,
            user_message,
            ai_message,
        })
    }

    /// Look up the requested conversation or open a new one titled from `message`.
    async fn resolve_conversation(
        &self,
        user_id: UserId,
        message: &str,
        conversation_id: Option<ConversationId>,
    ) -> Result<Conversation, ChatError> {
        match conversation_id {
            Some(id) => match self.store.get_conversation(id).await? {
                Some(conversation) if conversation.user_id == user_id => Ok(conversation),
                _ => Err(ChatError::ConversationNotFound(id)),
            },
            None => {
                let conversation = self
                    .store
                    .create_conversation(user_id, &conversation_title(message))
                    .await?;
                info!(conversation_id = %conversation.id, "conversation created");
                Ok(conversation)
            }
        }
    }

    /// Render up to [`PRODUCT_CONTEXT_LIMIT`] in-stock products matching `message`.
    ///
    /// Lookup failures are logged and skipped; the reply goes ahead without them.
    async fn product_context_for(&self, message: &str) -> Option<String> {
        match self.store.search_products(message).await {
            Ok(mut products) => {
                products.truncate(PRODUCT_CONTEXT_LIMIT);
                render_product_context(&products)
            }
            Err(e) => {
                warn!(error = %e, "product lookup for prompt context failed");
                None
            }
        }
    }
}
