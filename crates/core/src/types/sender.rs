//! Message sender discriminator.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Who wrote a chat message.
///
/// Stored in `PostgreSQL` as the `message_sender` enum and sent over the wire
/// as `"user"` or `"ai"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "message_sender", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The shopper typing into the widget.
    User,
    /// The generated assistant reply.
    Ai,
}

impl Sender {
    /// Wire/database name of the sender.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Ai).unwrap(), "\"ai\"");
        assert_eq!(serde_json::from_str::<Sender>("\"ai\"").unwrap(), Sender::Ai);
        assert!(serde_json::from_str::<Sender>("\"assistant\"").is_err());
        assert_eq!(Sender::Ai.to_string(), "ai");
    }
}
