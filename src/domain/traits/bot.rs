use async_trait::async_trait;
use crate::application::errors::BotError;

/// Bot trait - abstraction for messaging platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Start the bot, resolving its identity on the platform
    async fn start(&mut self) -> Result<(), BotError>;

    /// Send a text message, optionally as a reply to `reply_to`
    async fn send_message(&self, chat_id: i64, reply_to: Option<i64>, text: &str) -> Result<i64, BotError>;

    /// Upload raw image bytes as a photo
    async fn send_photo(&self, chat_id: i64, reply_to: Option<i64>, photo: Vec<u8>) -> Result<i64, BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
