//! Integration tests for StoreChat.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests over the in-memory store (no database needed)
//! cargo test -p storechat-integration-tests
//!
//! # Include the PostgreSQL store tests
//! STORECHAT_TEST_DATABASE_URL=postgres://localhost/storechat_test \
//!     cargo test -p storechat-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `chat_flow` - Full chat turns through the router, LLM mocked with `wiremock`
//! - `postgres_store` - `PgStore` against a live database (`#[ignore]`d)

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use storechat_server::config::ServerConfig;
use storechat_server::db::{ChatStore, MemoryStore, PgStore};
use storechat_server::llm::CompletionClient;
use storechat_server::state::AppState;

/// Path the mock provider serves completions on.
pub const COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";

/// Environment variable naming the throwaway test database.
pub const TEST_DATABASE_URL_VAR: &str = "STORECHAT_TEST_DATABASE_URL";

/// A router over a fresh in-memory store, plus a handle to that store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// App with no API key: every reply is the "not configured" notice.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::with_env(&[])
    }

    /// App whose completion endpoint is the given mock server.
    #[must_use]
    pub fn with_llm(mock_server_uri: &str) -> Self {
        let url = format!("{mock_server_uri}{COMPLETIONS_PATH}");
        Self::with_env(&[("GROQ_API_KEY", "gsk_test"), ("LLM_API_URL", url.as_str())])
    }

    /// App configured from `vars` on top of a dummy database URL.
    #[must_use]
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        env.entry("STORECHAT_DATABASE_URL".to_owned())
            .or_insert_with(|| "postgres://unused/test".to_owned());

        let config = ServerConfig::from_lookup(&move |key: &str| env.get(key).cloned())
            .expect("test configuration");
        let llm = CompletionClient::new(&config.llm).expect("completion client");
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, Arc::clone(&store) as Arc<dyn ChatStore>, llm);

        Self {
            router: storechat_server::app(state),
            store,
        }
    }

    /// Send a request and decode the JSON response body (`Null` if empty).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// `GET uri`.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// `POST uri` with a JSON body.
    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Register a widget user and return its id.
    pub async fn create_user(&self, username: &str, email: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/users",
                &serde_json::json!({"username": username, "email": email}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create user: {body}");
        body["id"].as_str().unwrap().to_owned()
    }
}

/// Connect to the test database and apply migrations.
///
/// Returns `None` when `STORECHAT_TEST_DATABASE_URL` is unset.
pub async fn pg_store() -> Option<PgStore> {
    let url = std::env::var(TEST_DATABASE_URL_VAR).ok()?;
    let pool = storechat_server::db::create_pool(&SecretString::from(url))
        .await
        .expect("connect to test database");
    storechat_server::db::run_migrations(&pool)
        .await
        .expect("run migrations");
    Some(PgStore::new(pool))
}

/// A suffix that keeps usernames and emails unique across test runs.
#[must_use]
pub fn unique_suffix() -> String {
    storechat_core::UserId::new().to_string().chars().take(8).collect()
}
