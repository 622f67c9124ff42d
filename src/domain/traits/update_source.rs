use async_trait::async_trait;
use crate::application::errors::BotError;
use crate::domain::entities::Message;

/// Where inbound messages come from.
///
/// Implementations are picked once at startup (long polling in
/// development, webhook in production) and hand the run loop the same
/// `Message` values either way.
#[async_trait]
pub trait UpdateSource: Send {
    /// Register with the platform before the first batch
    async fn prepare(&mut self) -> Result<(), BotError>;

    /// Wait for the next batch of messages
    async fn next_batch(&mut self) -> Result<Vec<Message>, BotError>;

    fn name(&self) -> &'static str;
}
