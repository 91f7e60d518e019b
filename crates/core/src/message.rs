//! Message domain types.
//!
//! Messages are the chat log of a session:
//! User types a line → it is appended → the model replies → the reply is appended.
//! A message never changes after it is appended, and its position in the log
//! is its only identity.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The role of a message sender in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The player
    User,
    /// The narrator model
    Model,
    /// Out-of-band notices
    System,
}

/// A single message in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new model message.
    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Override the timestamp (imports, fixtures).
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Rough token estimate (4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.content.len().div_ceil(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Tôi bước vào quán bar.");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Tôi bước vào quán bar.");
        assert!(msg.timestamp > 0);
    }

    #[test]
    fn role_uses_lowercase_wire_names() {
        let msg = Message::model("Welcome.").with_timestamp(42);
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"model","content":"Welcome.","timestamp":42}"#);
    }

    #[test]
    fn message_parses_from_ui_shape() {
        let msg: Message =
            serde_json::from_str(r#"{"role":"system","content":"note","timestamp":1700000000000}"#)
                .unwrap();
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(Message::user("12345").estimated_tokens(), 2);
        assert_eq!(Message::user("").estimated_tokens(), 0);
    }
}
