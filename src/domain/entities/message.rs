use super::User;
use chrono::{DateTime, Utc};

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Empty,
}

impl Content {
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Content::Command { .. })
    }
}

/// An inbound chat message, independent of how it was received
#[derive(Debug, Clone)]
pub struct Message {
    /// Platform message id, used to thread the reply
    pub id: i64,
    pub chat_id: i64,
    pub sender: Option<User>,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: i64, chat_id: i64, content: Content) -> Self {
        Self {
            id,
            chat_id,
            sender: None,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn from_text(id: i64, chat_id: i64, text: impl Into<String>) -> Self {
        Self::new(id, chat_id, Content::Text(text.into()))
    }

    pub fn from_command(id: i64, chat_id: i64, name: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(id, chat_id, Content::Command { name: name.into(), args })
    }

    pub fn with_sender_opt(mut self, user: Option<User>) -> Self {
        if let Some(u) = user {
            self.sender = Some(u);
        }
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
