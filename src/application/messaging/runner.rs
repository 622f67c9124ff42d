//! Bot runner - pulls updates from a source and answers each message

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use super::dispatcher::{MessageDispatcher, Reply};
use crate::application::errors::BotError;
use crate::domain::entities::Message;
use crate::domain::traits::{Bot, ImageFetcher, PageFetcher, UpdateSource};

/// Pause after a failed batch before asking again
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Drives the update loop. Every message is handled on its own task so a
/// slow profile lookup never holds up other chats.
pub struct BotRunner<B, P, I>
where
    B: Bot + 'static,
    P: PageFetcher + 'static,
    I: ImageFetcher + 'static,
{
    bot: Arc<B>,
    dispatcher: Arc<MessageDispatcher<P, I>>,
    retry_delay: Duration,
}

impl<B, P, I> BotRunner<B, P, I>
where
    B: Bot + 'static,
    P: PageFetcher + 'static,
    I: ImageFetcher + 'static,
{
    pub fn new(bot: Arc<B>, dispatcher: MessageDispatcher<P, I>) -> Self {
        Self {
            bot,
            dispatcher: Arc::new(dispatcher),
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Run until the source closes. Fetch errors are logged and retried.
    pub async fn run(&self, source: &mut dyn UpdateSource) -> Result<(), BotError> {
        source.prepare().await?;
        tracing::info!("Receiving updates via {}", source.name());

        let mut tasks = JoinSet::new();

        loop {
            match source.next_batch().await {
                Ok(messages) => {
                    for message in messages {
                        let bot = Arc::clone(&self.bot);
                        let dispatcher = Arc::clone(&self.dispatcher);
                        tasks.spawn(async move {
                            handle_message(bot.as_ref(), dispatcher.as_ref(), message).await;
                        });
                    }
                    // reap finished handlers so the set doesn't grow forever
                    while let Some(joined) = tasks.try_join_next() {
                        if let Err(e) = joined {
                            tracing::error!("Message handler panicked: {}", e);
                        }
                    }
                }
                Err(BotError::SourceClosed) => {
                    tracing::info!("Update source {} closed", source.name());
                    while let Some(joined) = tasks.join_next().await {
                        if let Err(e) = joined {
                            tracing::error!("Message handler panicked: {}", e);
                        }
                    }
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!("Failed to get updates: {}", e);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}

/// Answer a single message, replying to it in its chat
pub async fn handle_message<B, P, I>(bot: &B, dispatcher: &MessageDispatcher<P, I>, message: Message)
where
    B: Bot + ?Sized,
    P: PageFetcher,
    I: ImageFetcher,
{
    let sender = message
        .sender
        .as_ref()
        .map(|u| u.display_name())
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!("[{}] {}: {:?}", message.chat_id, sender, message.content.text().unwrap_or(""));

    let Some(reply) = dispatcher.dispatch(&message).await else {
        return;
    };

    let sent = match reply {
        Reply::Text(text) => bot.send_message(message.chat_id, Some(message.id), &text).await,
        Reply::Photo(bytes) => bot.send_photo(message.chat_id, Some(message.id), bytes).await,
    };

    if let Err(e) = sent {
        tracing::error!("[{}] Failed to send reply: {}", message.chat_id, e);
    }
}
