//! Wire types for the `OpenAI`-compatible chat-completions API.

use serde::{Deserialize, Serialize};

use storechat_core::Sender;

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl From<Sender> for Role {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Self::User,
            Sender::Ai => Self::Assistant,
        }
    }
}

/// A single prompt message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// A system instruction.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response body from `POST /chat/completions`.
///
/// Only the fields the assistant reads are modelled; everything else the
/// provider sends (usage, ids, logprobs) is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One generated alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

/// The assistant message inside a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if it has any non-blank content.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let messages = [ChatMessage::system("Be brief."), ChatMessage::user("Hi")];
        let request = CompletionRequest {
            model: "llama-3.3-70b-versatile",
            messages: &messages,
            max_tokens: 1000,
            temperature: 0.5,
        };

        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Hi");
    }

    #[test]
    fn test_role_from_sender() {
        assert_eq!(Role::from(Sender::User), Role::User);
        assert_eq!(Role::from(Sender::Ai), Role::Assistant);
    }

    #[test]
    fn test_into_text_takes_first_choice() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hello!"}}]}"#,
        )
        .expect("deserialize");
        assert_eq!(response.into_text().as_deref(), Some("Hello!"));
    }

    #[test]
    fn test_into_text_empty_cases() {
        let no_choices: CompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).expect("deserialize");
        assert!(no_choices.into_text().is_none());

        let null_content: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#)
                .expect("deserialize");
        assert!(null_content.into_text().is_none());

        let blank: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#)
                .expect("deserialize");
        assert!(blank.into_text().is_none());
    }
}
