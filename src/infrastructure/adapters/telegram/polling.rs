//! Long polling update source, used in development

use std::sync::Arc;

use async_trait::async_trait;

use super::TelegramAdapter;
use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::domain::entities::Message;
use crate::domain::traits::UpdateSource;

/// Pulls updates with `getUpdates`, tracking the offset between calls
pub struct PollingUpdateSource {
    adapter: Arc<TelegramAdapter>,
    parser: MessageParser,
    offset: i64,
    timeout_seconds: u64,
}

impl PollingUpdateSource {
    pub fn new(adapter: Arc<TelegramAdapter>, parser: MessageParser, timeout_seconds: u64) -> Self {
        Self {
            adapter,
            parser,
            offset: 0,
            timeout_seconds,
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

#[async_trait]
impl UpdateSource for PollingUpdateSource {
    async fn prepare(&mut self) -> Result<(), BotError> {
        // getUpdates is refused while a webhook is registered
        self.adapter.delete_webhook().await
    }

    async fn next_batch(&mut self) -> Result<Vec<Message>, BotError> {
        let updates = self.adapter.get_updates(self.offset, self.timeout_seconds).await?;

        if let Some(next) = TelegramAdapter::get_next_offset(&updates) {
            self.offset = next;
        }

        Ok(updates
            .into_iter()
            .filter_map(|u| u.into_message(&self.parser))
            .collect())
    }

    fn name(&self) -> &'static str {
        "polling"
    }
}
