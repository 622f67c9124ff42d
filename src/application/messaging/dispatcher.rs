//! Message dispatcher - Routes messages to handlers

use crate::domain::entities::{Message, Content};
use crate::domain::traits::{ImageFetcher, PageFetcher};
use crate::application::errors::CommandError;
use crate::application::services::{CommandService, ProfileService};

pub const INVALID_COMMAND: &str = "Invalid Command";
pub const NOT_UNDERSTOOD: &str = "Sorry, I am not sure what you mean, Type /help to get help";

/// What to send back for one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Raw image bytes, uploaded as a photo
    Photo(Vec<u8>),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }
}

/// Message dispatcher - commands go to the command service, plain text is
/// treated as a handle and looked up
pub struct MessageDispatcher<P: PageFetcher, I: ImageFetcher> {
    commands: CommandService,
    profiles: ProfileService<P, I>,
}

impl<P: PageFetcher, I: ImageFetcher> MessageDispatcher<P, I> {
    pub fn new(commands: CommandService, profiles: ProfileService<P, I>) -> Self {
        Self { commands, profiles }
    }

    /// Process a message; `None` means nothing should be sent back
    pub async fn dispatch(&self, message: &Message) -> Option<Reply> {
        match &message.content {
            Content::Command { name, .. } => {
                tracing::debug!("[{}] Command: /{}", message.chat_id, name);
                self.dispatch_command(message)
            }
            // the text is the handle, used verbatim
            Content::Text(handle) if handle.is_empty() => None,
            Content::Text(handle) => Some(self.lookup(message.chat_id, handle).await),
            Content::Empty => Some(Reply::text(NOT_UNDERSTOOD)),
        }
    }

    fn dispatch_command(&self, message: &Message) -> Option<Reply> {
        match self.commands.handle(message) {
            Ok(response) => response.map(Reply::Text),
            Err(CommandError::NotFound(name)) => {
                tracing::debug!("[{}] Unknown command /{}", message.chat_id, name);
                Some(Reply::text(INVALID_COMMAND))
            }
        }
    }

    async fn lookup(&self, chat_id: i64, handle: &str) -> Reply {
        match self.profiles.resolve_profile_image(handle).await {
            Ok(resolved) => Reply::Photo(resolved.image),
            Err(e) => {
                if e.is_system_fault() {
                    tracing::warn!("[{}] Lookup of {:?} failed: {}", chat_id, handle, e);
                } else {
                    tracing::info!("[{}] Lookup of {:?}: {}", chat_id, handle, e);
                }
                Reply::text(e.user_reply())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::application::errors::{
        FetchError, REPLY_FETCH_ERROR, REPLY_IMAGE_ERROR, REPLY_INVALID_USER, REPLY_UNEXPECTED_FORMAT,
    };
    use crate::application::services::command_service::HELP_TEXT;
    use crate::infrastructure::profile_page::MetadataExtractor;

    /// Serves a fixed page per handle, 500 for anything else
    struct Pages(Vec<(&'static str, &'static str)>);

    #[async_trait]
    impl PageFetcher for Pages {
        async fn fetch_page(&self, handle: &str) -> Result<Vec<u8>, FetchError> {
            self.0
                .iter()
                .find(|(h, _)| *h == handle)
                .map(|(_, body)| body.as_bytes().to_vec())
                .ok_or_else(|| FetchError::Status { status: 500, url: handle.to_string() })
        }
    }

    /// Only the NASA picture is downloadable
    struct Images;

    #[async_trait]
    impl ImageFetcher for Images {
        async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            if url == "https://img/x_s1080x1080.jpg" {
                Ok(vec![1, 2, 3])
            } else {
                Err(FetchError::Status { status: 404, url: url.to_string() })
            }
        }
    }

    fn dispatcher() -> MessageDispatcher<Pages, Images> {
        let mut commands = CommandService::new("/");
        commands.register_defaults();
        let pages = Pages(vec![
            ("nasa", r#"<meta value="og:title" content="NASA (@nasa)"><meta value="og:image" content="https://img/x_s150x150.jpg">"#),
            ("broken", r#"<meta value="og:title" content="NASA (@nasa)"><meta value="og:image" content="https://img/y_s150x150.jpg">"#),
            ("ghost", "<html><body>Sorry, this page isn't available.</body></html>"),
            ("odd", r#"<meta value="og:title" content="Just a name">"#),
        ]);
        MessageDispatcher::new(commands, ProfileService::new(pages, Images, MetadataExtractor::new()))
    }

    #[tokio::test]
    async fn test_handle_gets_photo() {
        let reply = dispatcher().dispatch(&Message::from_text(1, 42, "nasa")).await;
        assert_eq!(reply, Some(Reply::Photo(vec![1, 2, 3])));
    }

    #[tokio::test]
    async fn test_failure_replies() {
        let d = dispatcher();
        let cases = [
            ("unreachable", REPLY_FETCH_ERROR),
            ("ghost", REPLY_INVALID_USER),
            ("odd", REPLY_UNEXPECTED_FORMAT),
            ("broken", REPLY_IMAGE_ERROR),
        ];
        for (handle, expected) in cases {
            let reply = d.dispatch(&Message::from_text(1, 42, handle)).await;
            assert_eq!(reply, Some(Reply::text(expected)), "handle {}", handle);
        }
    }

    #[tokio::test]
    async fn test_commands() {
        let d = dispatcher();
        let help = d.dispatch(&Message::from_command(1, 42, "start", vec![])).await;
        assert_eq!(help, Some(Reply::text(HELP_TEXT)));

        let unknown = d.dispatch(&Message::from_command(1, 42, "nasa", vec![])).await;
        assert_eq!(unknown, Some(Reply::text(INVALID_COMMAND)));
    }

    #[tokio::test]
    async fn test_empty_text_is_ignored() {
        assert_eq!(dispatcher().dispatch(&Message::from_text(1, 42, "")).await, None);
    }

    #[tokio::test]
    async fn test_handle_is_not_trimmed() {
        // " nasa" is a different handle from "nasa"
        let reply = dispatcher().dispatch(&Message::from_text(1, 42, " nasa")).await;
        assert_eq!(reply, Some(Reply::text(REPLY_FETCH_ERROR)));
    }

    #[tokio::test]
    async fn test_non_text_message() {
        let msg = Message::new(1, 42, Content::Empty);
        assert_eq!(dispatcher().dispatch(&msg).await, Some(Reply::text(NOT_UNDERSTOOD)));
    }
}
