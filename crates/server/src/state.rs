//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::ChatStore;
use crate::llm::CompletionClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store is a trait object so the same
/// router runs against `PostgreSQL` in production and memory in tests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn ChatStore>,
    llm: CompletionClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn ChatStore>, llm: CompletionClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store, llm }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the conversation store.
    #[must_use]
    pub fn store(&self) -> &dyn ChatStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the chat-completion client.
    #[must_use]
    pub fn llm(&self) -> &CompletionClient {
        &self.inner.llm
    }
}
