//! Message parser - Parses raw messages into structured messages

use crate::domain::entities::{Message, Content, User};

/// Parses incoming messages into structured Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse an inbound message; `None` text means a non-text message
    pub fn parse(&self, id: i64, chat_id: i64, text: Option<&str>, sender: Option<User>) -> Message {
        let content = match text {
            None => Content::Empty,
            Some(text) if text.starts_with(&self.command_prefix) => self.parse_command(text),
            Some(text) => Content::Text(text.to_string()),
        };

        Message::new(id, chat_id, content).with_sender_opt(sender)
    }

    /// Parse a command message
    fn parse_command(&self, text: &str) -> Content {
        let cmd_text = &text[self.command_prefix.len()..];

        // Split command and arguments
        let mut parts = cmd_text.split_whitespace();
        let head = parts.next().unwrap_or_default();
        // Group chats address commands as /name@bot_username
        let name = head.split('@').next().unwrap_or_default().to_string();
        let args = parts.map(|s| s.to_string()).collect();

        Content::Command { name, args }
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new("/")
    }
}
