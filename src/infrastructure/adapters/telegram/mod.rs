//! Telegram adapter

pub mod polling;
pub mod webhook;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::domain::entities;
use crate::domain::traits::{Bot, BotInfo};

pub use polling::PollingUpdateSource;
pub use webhook::WebhookUpdateSource;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub date: Option<i64>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResult {
    message_id: i64,
}

impl Update {
    /// Convert into a domain message; updates without a message are skipped
    pub fn into_message(self, parser: &MessageParser) -> Option<entities::Message> {
        let msg = self.message?;

        let sender = msg.from.map(|u| {
            let mut user = entities::User::new(u.id);
            user.username = u.username;
            user.first_name = u.first_name;
            user
        });

        let mut message = parser.parse(msg.message_id, msg.chat.id, msg.text.as_deref(), sender);
        if let Some(ts) = msg.date.and_then(|d| chrono::DateTime::<chrono::Utc>::from_timestamp(d, 0)) {
            message = message.with_timestamp(ts);
        }
        Some(message)
    }
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    api_base: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: API_BASE.to_string(),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: "instapic-bot".to_string(),
                username: "instapic_bot".to_string(),
            },
        }
    }

    /// Point the adapter at another Bot API server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Token prefix that is safe to log
    fn token_hint(&self) -> &str {
        let end = self.token.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.token.len());
        &self.token[..end]
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base.trim_end_matches('/'), self.token, method)
    }

    async fn read_result<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T, BotError> {
        let status = response.status();
        let data: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(format!("{}: {}", method, e)))?;

        if !data.ok || !status.is_success() {
            let description = data.description.unwrap_or_else(|| status.to_string());
            return Err(BotError::Api(format!("{}: {}", method, description)));
        }

        data.result
            .ok_or_else(|| BotError::Parse(format!("{}: missing result", method)))
    }

    /// POST a JSON body to a Bot API method
    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T, BotError> {
        let response = self.client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::Network(e.without_url().to_string()))?;

        Self::read_result(method, response).await
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: Option<String>,
        }

        let data: BotInfoResponse = self.call("getMe", &serde_json::json!({})).await?;

        self.info = BotInfo {
            id: data.id.to_string(),
            name: data.first_name,
            username: data.username.unwrap_or_default(),
        };

        Ok(())
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: u64,
            allowed_updates: Vec<String>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };

        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update]) -> Option<i64> {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
    }

    /// Remove any webhook so getUpdates works
    pub async fn delete_webhook(&self) -> Result<(), BotError> {
        let _: bool = self.call("deleteWebhook", &serde_json::json!({})).await?;
        tracing::info!("Webhook removed");
        Ok(())
    }

    /// Ask Telegram to post updates to `url`
    pub async fn set_webhook(&self, url: &str) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct SetWebhookRequest<'a> {
            url: &'a str,
            allowed_updates: Vec<&'a str>,
        }

        let request = SetWebhookRequest {
            url,
            allowed_updates: vec!["message"],
        };
        let _: bool = self.call("setWebhook", &request).await?;
        tracing::info!("Webhook set (token: {}...)", self.token_hint());
        Ok(())
    }

    /// Send a message via Telegram API
    pub async fn send_message_api(&self, chat_id: i64, reply_to: Option<i64>, text: &str) -> Result<i64, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: i64,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            reply_to_message_id: Option<i64>,
        }

        let request = SendMessageRequest {
            chat_id,
            text,
            reply_to_message_id: reply_to,
        };

        let data: MessageResult = self.call("sendMessage", &request).await?;
        Ok(data.message_id)
    }

    /// Upload a photo as multipart form data
    pub async fn send_photo_api(&self, chat_id: i64, reply_to: Option<i64>, photo: Vec<u8>) -> Result<i64, BotError> {
        let part = Part::bytes(photo).file_name("profile.jpg");
        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", part);
        if let Some(reply_to) = reply_to {
            form = form.text("reply_to_message_id", reply_to.to_string());
        }

        let response = self.client
            .post(self.api_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BotError::Network(e.without_url().to_string()))?;

        let data: MessageResult = Self::read_result("sendPhoto", response).await?;
        Ok(data.message_id)
    }

    /// Send chat action (typing, upload_photo, etc.)
    pub async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<(), BotError> {
        let _: bool = self
            .call("sendChatAction", &serde_json::json!({ "chat_id": chat_id, "action": action }))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&mut self) -> Result<(), BotError> {
        tracing::info!("Starting Telegram bot (token: {}...)", self.token_hint());
        self.fetch_bot_info().await?;
        tracing::info!("Authorized on account @{}", self.info.username);
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, reply_to: Option<i64>, text: &str) -> Result<i64, BotError> {
        tracing::debug!("Sending to {}: {}", chat_id, text);
        self.send_message_api(chat_id, reply_to, text).await
    }

    async fn send_photo(&self, chat_id: i64, reply_to: Option<i64>, photo: Vec<u8>) -> Result<i64, BotError> {
        tracing::debug!("Sending {} byte photo to {}", photo.len(), chat_id);

        // Upload indicator is cosmetic
        if let Err(e) = self.send_chat_action(chat_id, "upload_photo").await {
            tracing::debug!("Chat action failed: {}", e);
        }

        self.send_photo_api(chat_id, reply_to, photo).await
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
