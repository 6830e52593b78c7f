//! Conversation history route handlers.
//!
//! Unknown ids yield empty lists; malformed ids are a 400.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tracing::instrument;

use storechat_core::{ConversationId, UserId, parse_id};

use crate::error::{AppError, Result};
use crate::models::{Conversation, Message};
use crate::state::AppState;

/// Build the conversations router.
///
/// Both routes share the `{id}` segment name: the first is a user id, the
/// second a conversation id.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversations/{id}", get(list_conversations))
        .route("/conversations/{id}/messages", get(list_messages))
}

/// List a user's conversations, most recently updated first.
#[instrument(skip(state))]
async fn list_conversations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Conversation>>> {
    let user_id: UserId = parse_id("user", &id).map_err(AppError::Validation)?;
    Ok(Json(state.store().list_conversations(user_id).await?))
}

/// List a conversation's messages, oldest first.
#[instrument(skip(state))]
async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>> {
    let conversation_id: ConversationId =
        parse_id("conversation", &id).map_err(AppError::Validation)?;
    Ok(Json(state.store().list_messages(conversation_id).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use storechat_core::{Email, Sender};

    use super::*;
    use crate::db::ChatStore;
    use crate::models::NewUser;
    use crate::routes::app;
    use crate::routes::test_support::{body_json, get_request, test_state};

    #[tokio::test]
    async fn test_lists_conversations_and_messages() {
        let (state, store) = test_state();
        let user = store
            .create_user(NewUser::demo("demo_user", Email::parse("demo@example.com").unwrap()))
            .await
            .unwrap();
        let conversation = store.create_conversation(user.id, "Hello").await.unwrap();
        store
            .create_message(conversation.id, "Hello", Sender::User)
            .await
            .unwrap();
        store
            .create_message(conversation.id, "Hi! How can I help?", Sender::Ai)
            .await
            .unwrap();

        let router = app(state);

        let response = router
            .clone()
            .oneshot(get_request(&format!("/api/conversations/{}", user.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["title"], "Hello");
        assert_eq!(body[0]["userId"], user.id.to_string());
        assert!(body[0]["updatedAt"].is_string());

        let response = router
            .oneshot(get_request(&format!(
                "/api/conversations/{}/messages",
                conversation.id
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let senders: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["sender"].as_str().unwrap())
            .collect();
        assert_eq!(senders, ["user", "ai"]);
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_conversations() {
        let (state, _) = test_state();
        let response = app(state)
            .oneshot(get_request(&format!("/api/conversations/{}", UserId::new())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_malformed_id_is_400() {
        let (state, _) = test_state();
        let response = app(state)
            .oneshot(get_request("/api/conversations/abc/messages"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "invalid conversation id: abc"
        );
    }
}
