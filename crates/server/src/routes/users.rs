//! User route handlers.
//!
//! There is no authentication: the widget registers a username and email,
//! and the email alone identifies the user on return visits.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{info, instrument};

use storechat_core::{Email, UserId, parse_id};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::ValidatedJson;
use crate::models::{NewUser, User};
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(find_or_create_user))
        .route("/users/{id}", get(get_user))
}

/// Request to register (or return to) the widget.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CreateUserRequest {
    /// Validate into a trimmed username and a parsed email.
    fn validate(self) -> Result<(String, Email)> {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::Validation("username is required".to_owned()))?
            .to_owned();

        let email = self
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AppError::Validation("email is required".to_owned()))?;
        let email = Email::parse(email).map_err(|e| AppError::Validation(e.to_string()))?;

        Ok((username, email))
    }
}

/// Return the user with this email, creating one if none exists.
#[instrument(skip(state, request))]
async fn find_or_create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<Json<User>> {
    let (username, email) = request.validate()?;
    let store = state.store();

    if let Some(user) = store.get_user_by_email(&email).await? {
        return Ok(Json(user));
    }

    match store.create_user(NewUser::demo(username, email.clone())).await {
        Ok(user) => {
            info!(user_id = %user.id, "user created");
            Ok(Json(user))
        }
        // Lost a race with a request for the same email, or the username is taken.
        Err(RepositoryError::Conflict(_)) => store
            .get_user_by_email(&email)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::Validation("username is already taken".to_owned())),
        Err(e) => Err(e.into()),
    }
}

/// Get a user by id.
#[instrument(skip(state))]
async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let user_id: UserId = parse_id("user", &id).map_err(AppError::Validation)?;
    state
        .store()
        .get_user(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::app;
    use crate::routes::test_support::{body_json, get_request, json_request, test_state};

    #[tokio::test]
    async fn test_same_email_returns_same_user() {
        let (state, _) = test_state();
        let router = app(state);
        let body = json!({"username": "demo_user", "email": "demo@example.com"});

        let first = router
            .clone()
            .oneshot(json_request("POST", "/api/users", &body))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let first = body_json(first).await;

        let second = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/users",
                &json!({"username": "someone_else", "email": "demo@example.com"}),
            ))
            .await
            .unwrap();
        let second = body_json(second).await;

        assert_eq!(first["id"], second["id"]);
        assert_eq!(second["username"], "demo_user");
        assert!(second.get("password").is_none());

        let id = first["id"].as_str().unwrap();
        let fetched = router
            .oneshot(get_request(&format!("/api/users/{id}")))
            .await
            .unwrap();
        assert_eq!(fetched.status(), StatusCode::OK);
        assert_eq!(body_json(fetched).await["email"], "demo@example.com");
    }

    #[tokio::test]
    async fn test_invalid_user_requests_are_400() {
        let (state, _) = test_state();
        let router = app(state);

        for body in [
            json!({"email": "demo@example.com"}),
            json!({"username": "demo_user"}),
            json!({"username": "  ", "email": "demo@example.com"}),
            json!({"username": "demo_user", "email": "not-an-email"}),
        ] {
            let response = router
                .clone()
                .oneshot(json_request("POST", "/api/users", &body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        }
    }

    #[tokio::test]
    async fn test_taken_username_is_400() {
        let (state, _) = test_state();
        let router = app(state);

        router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/users",
                &json!({"username": "demo_user", "email": "demo@example.com"}),
            ))
            .await
            .unwrap();

        let response = router
            .oneshot(json_request(
                "POST",
                "/api/users",
                &json!({"username": "demo_user", "email": "other@example.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "username is already taken"
        );
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let (state, _) = test_state();
        let response = app(state)
            .oneshot(get_request(&format!("/api/users/{}", UserId::new())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
