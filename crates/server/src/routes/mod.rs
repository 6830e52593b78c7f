//! HTTP route handlers for the chat widget API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                            - Liveness check
//! GET  /health/ready                      - Readiness check (store ping)
//!
//! POST /api/chat                          - Send a message, get the AI reply
//! GET  /api/conversations/{userId}        - A user's conversations
//! GET  /api/conversations/{id}/messages   - A conversation's messages
//! POST /api/users                         - Find or create a user by email
//! GET  /api/users/{id}                    - Get a user
//! GET  /api/products?skip=&limit=         - Page through the catalogue
//! GET  /api/products/search?q=            - Search in-stock products
//! GET  /api/products/{id}                 - Get a product
//! GET  /api/stats                         - Row counts per table
//! ```

pub mod chat;
pub mod conversations;
pub mod products;
pub mod stats;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header::CONTENT_TYPE},
    middleware::from_fn,
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::{REQUEST_ID_HEADER, request_id_middleware};
use crate::state::AppState;

/// Create the `/api` routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(chat::router())
        .merge(conversations::router())
        .merge(users::router())
        .merge(products::router())
        .merge(stats::router())
}

/// Build the complete application: health checks, API routes, request IDs,
/// tracing and CORS.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().cors_origin.as_deref());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<axum::body::Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors)
}

/// CORS for the widget: one configured origin, or any origin when unset.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "invalid CORS origin, allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([axum::http::HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, Response};
    use http_body_util::BodyExt;

    use crate::config::{LlmConfig, ServerConfig};
    use crate::db::{ChatStore, MemoryStore};
    use crate::llm::CompletionClient;
    use crate::state::AppState;

    /// State over a fresh in-memory store with no API key configured.
    pub fn test_state() -> (AppState, Arc<MemoryStore>) {
        let vars: HashMap<&str, &str> =
            HashMap::from([("STORECHAT_DATABASE_URL", "postgres://unused/test")]);
        let config =
            ServerConfig::from_lookup(&|key| vars.get(key).map(|v| (*v).to_string())).unwrap();
        let llm = CompletionClient::new(&LlmConfig::unconfigured()).unwrap();
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, Arc::clone(&store) as Arc<dyn ChatStore>, llm);
        (state, store)
    }

    pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower::ServiceExt;

    use super::test_support::{get_request, test_state};
    use super::*;

    #[tokio::test]
    async fn test_health_is_ok_with_request_id() {
        let (state, _) = test_state();
        let response = app(state).oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_upstream_request_id_is_echoed() {
        let (state, _) = test_state();
        let request = axum::http::Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, "edge-42")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "edge-42");
    }

    #[tokio::test]
    async fn test_readiness_with_memory_store() {
        let (state, _) = test_state();
        let response = app(state)
            .oneshot(get_request("/health/ready"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
