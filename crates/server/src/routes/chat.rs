//! Chat route handler.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use storechat_core::{ConversationId, MessageId, Sender, UserId};

use crate::error::Result;
use crate::middleware::ValidatedJson;
use crate::models::Message;
use crate::services::{ChatService, ChatTurn};
use crate::state::AppState;

/// Build the chat router.
pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(send_message))
}

/// Request to send a message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub user_id: UserId,
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
}

/// One side of a chat turn.
#[derive(Debug, Serialize)]
pub struct TurnMessage {
    pub id: MessageId,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for TurnMessage {
    fn from(msg: Message) -> Self {
        Self {
            id: msg.id,
            content: msg.content,
            sender: msg.sender,
            timestamp: msg.timestamp,
        }
    }
}

/// Response for a completed chat turn.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub conversation_id: ConversationId,
    pub user_message: TurnMessage,
    pub ai_message: TurnMessage,
}

impl From<ChatTurn> for SendMessageResponse {
    fn from(turn: ChatTurn) -> Self {
        Self {
            conversation_id: turn.conversation_id,
            user_message: turn.user_message.into(),
            ai_message: turn.ai_message.into(),
        }
    }
}

/// Send a message and return it with the assistant's reply.
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn send_message(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>> {
    let turn = ChatService::new(state.store(), state.llm())
        .with_product_context(state.config().product_context)
        .send_message(request.user_id, &request.message, request.conversation_id)
        .await?;

    Ok(Json(turn.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use storechat_core::Email;

    use super::*;
    use crate::db::ChatStore;
    use crate::llm::UNAVAILABLE_REPLY;
    use crate::models::NewUser;
    use crate::routes::app;
    use crate::routes::test_support::{body_json, json_request, test_state};

    #[tokio::test]
    async fn test_chat_without_key_returns_unavailable_reply() {
        let (state, store) = test_state();
        let user = store
            .create_user(NewUser::demo("demo_user", Email::parse("demo@example.com").unwrap()))
            .await
            .unwrap();

        let response = app(state)
            .oneshot(json_request(
                "POST",
                "/api/chat",
                &json!({"userId": user.id, "message": "Where is my order 123"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["conversationId"].is_string());
        assert_eq!(body["userMessage"]["sender"], "user");
        assert_eq!(body["userMessage"]["content"], "Where is my order 123");
        assert_eq!(body["aiMessage"]["sender"], "ai");
        assert_eq!(body["aiMessage"]["content"], UNAVAILABLE_REPLY);
        assert!(body["aiMessage"]["timestamp"].is_string());

        let conversations = store.list_conversations(user.id).await.unwrap();
        assert_eq!(conversations[0].title, "Where is my order...");
    }

    #[tokio::test]
    async fn test_chat_unknown_user_is_404() {
        let (state, _) = test_state();
        let response = app(state)
            .oneshot(json_request(
                "POST",
                "/api/chat",
                &json!({"userId": UserId::new(), "message": "hi"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "User not found");
    }

    #[tokio::test]
    async fn test_chat_malformed_body_is_400() {
        let (state, _) = test_state();
        let router = app(state);

        for body in [
            json!({"message": "missing user"}),
            json!({"userId": "not-a-uuid", "message": "hi"}),
            json!({"userId": UserId::new(), "message": 42}),
        ] {
            let response = router
                .clone()
                .oneshot(json_request("POST", "/api/chat", &body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        }
    }

    #[tokio::test]
    async fn test_chat_blank_message_is_400() {
        let (state, store) = test_state();
        let user = store
            .create_user(NewUser::demo("demo_user", Email::parse("demo@example.com").unwrap()))
            .await
            .unwrap();

        let response = app(state)
            .oneshot(json_request(
                "POST",
                "/api/chat",
                &json!({"userId": user.id, "message": "  "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
