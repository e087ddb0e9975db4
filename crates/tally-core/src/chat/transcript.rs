//! Conversation transcript types
//!
//! A transcript is the ordered conversation state exchanged with the
//! chat-completion service. One transcript is owned by exactly one
//! orchestration run; nothing is shared across requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A model-issued request to invoke a named tool
///
/// The id is generated by the model and must be echoed back verbatim on the
/// corresponding result message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// One conversation turn
///
/// A single tagged type rather than a subtype per role: role-specific fields
/// live only on the variants that carry them, and handling stays exhaustive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    /// Result of one tool call; `call_id` pairs it with a request from the
    /// immediately preceding assistant message.
    ToolResult {
        call_id: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant_with_tool_calls(
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            content: content.into(),
        }
    }

    /// Role name as sent over the wire
    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::ToolResult { .. } => "tool_result",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::User { content }
            | Self::Assistant { content, .. }
            | Self::ToolResult { content, .. } => content,
        }
    }
}

/// Ordered, append-only conversation history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles() {
        assert_eq!(Message::system("s").role(), "system");
        assert_eq!(Message::user("u").role(), "user");
        assert_eq!(Message::assistant("a").role(), "assistant");
        assert_eq!(Message::tool_result("id", "r").role(), "tool_result");
    }

    #[test]
    fn test_message_serialization_is_role_tagged() {
        let msg = Message::assistant_with_tool_calls(
            "",
            vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: "get_users".to_string(),
                arguments: json!({}),
            }],
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["tool_calls"][0]["name"], "get_users");

        let plain = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert!(plain.get("tool_calls").is_none());
    }

    #[test]
    fn test_transcript_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::system("prompt"));
        transcript.push(Message::user("hello"));
        transcript.push(Message::assistant("hi"));

        let roles: Vec<_> = transcript.messages().iter().map(Message::role).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
    }
}
