//! Message types for model conversations.

use serde::{Deserialize, Serialize};

use super::content::{ContentPart, MessageContent};

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,

    pub content: MessageContent,

    /// Optional name for the sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn new(role: MessageRole, content: MessageContent) -> Self {
        Self {
            role,
            content,
            name: None,
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, MessageContent::Text(content.into()))
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageContent::Text(content.into()))
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageContent::Text(content.into()))
    }

    /// Create a multimodal user message.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self::new(MessageRole::User, MessageContent::Parts(parts))
    }

    /// Text of the message, joining text parts with newlines.
    pub fn text(&self) -> String {
        self.content.text()
    }
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Token accounting reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::system("s").role, MessageRole::System);
        assert_eq!(Message::user("u").role, MessageRole::User);
        assert_eq!(Message::assistant("a").role, MessageRole::Assistant);
        assert_eq!(Message::user("hello").text(), "hello");
    }

    #[test]
    fn test_message_role_serialization() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_message_skips_empty_name() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert!(json.get("name").is_none());
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn test_user_parts_text() {
        let msg = Message::user_parts(vec![
            ContentPart::text("=== Page Screenshot ==="),
            ContentPart::image_base64("image/png", "AAAA"),
            ContentPart::text("=== Page State ==="),
        ]);
        assert_eq!(msg.text(), "=== Page Screenshot ===\n=== Page State ===");
    }
}
