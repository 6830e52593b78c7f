//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storechat_core::{Email, UserId};

/// Password stored for every widget user.
///
/// There is no authentication; the column exists so the schema matches a
/// conventional users table.
pub const DEMO_PASSWORD: &str = "demo";

/// A chat widget user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name chosen in the widget.
    pub username: String,
    /// Email address; the identity users are matched on.
    pub email: Email,
    /// Plain-text placeholder password, never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub password: String,
}

impl NewUser {
    /// A widget user with the placeholder password.
    #[must_use]
    pub fn demo(username: impl Into<String>, email: Email) -> Self {
        Self {
            username: username.into(),
            email,
            password: DEMO_PASSWORD.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_not_serialized() {
        let user = User {
            id: UserId::new(),
            username: "demo_user".to_string(),
            email: Email::parse("demo@example.com").unwrap(),
            password: DEMO_PASSWORD.to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "demo_user");
        assert_eq!(json["email"], "demo@example.com");
        assert!(json.get("password").is_none());
        assert!(json.get("createdAt").is_some());
    }
}
