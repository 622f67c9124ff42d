//! Webhook update source, used in production
//!
//! Telegram posts each update to `<public-url>/<token>`; the handler
//! forwards it over a channel to whoever is waiting in `next_batch`.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::mpsc;

use super::{TelegramAdapter, Update};
use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::domain::entities::Message;
use crate::domain::traits::UpdateSource;

/// Updates buffered between the HTTP handler and the dispatcher
const CHANNEL_CAPACITY: usize = 100;

/// Receives updates through an HTTP endpoint registered with `setWebhook`
pub struct WebhookUpdateSource {
    adapter: Arc<TelegramAdapter>,
    parser: MessageParser,
    port: u16,
    public_url: String,
    tx: mpsc::Sender<Update>,
    rx: mpsc::Receiver<Update>,
    local_addr: Option<SocketAddr>,
}

impl WebhookUpdateSource {
    pub fn new(adapter: Arc<TelegramAdapter>, parser: MessageParser, port: u16, public_url: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            adapter,
            parser,
            port,
            public_url: public_url.into(),
            tx,
            rx,
            local_addr: None,
        }
    }

    /// Route Telegram posts to; the token keeps it unguessable
    pub fn route_path(&self) -> String {
        format!("/{}", self.adapter.token())
    }

    pub fn webhook_url(&self) -> String {
        format!("{}{}", self.public_url.trim_end_matches('/'), self.route_path())
    }

    /// Address the server is bound to, once prepared
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

#[derive(Clone)]
struct WebhookState {
    tx: mpsc::Sender<Update>,
    token: Arc<str>,
}

/// Router for the webhook endpoint and a health check.
///
/// Bot tokens contain `:`, so the token is matched as a path parameter
/// and compared here rather than baked into the route.
pub fn router(token: &str, tx: mpsc::Sender<Update>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/:token", post(receive_update))
        .with_state(WebhookState { tx, token: Arc::from(token) })
}

async fn receive_update(
    State(state): State<WebhookState>,
    Path(token): Path<String>,
    Json(update): Json<Update>,
) -> StatusCode {
    if token != *state.token {
        return StatusCode::NOT_FOUND;
    }

    tracing::debug!("Webhook update {}", update.update_id);
    match state.tx.send(update).await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn health() -> &'static str {
    "ok"
}

#[async_trait]
impl UpdateSource for WebhookUpdateSource {
    async fn prepare(&mut self) -> Result<(), BotError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| BotError::Network(format!("failed to bind {}: {}", addr, e)))?;
        self.local_addr = listener.local_addr().ok();

        let app = router(self.adapter.token(), self.tx.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Webhook server error: {}", e);
            }
        });
        tracing::info!("Webhook server listening on {}", addr);

        self.adapter.set_webhook(&self.webhook_url()).await
    }

    async fn next_batch(&mut self) -> Result<Vec<Message>, BotError> {
        let first = self.rx.recv().await.ok_or(BotError::SourceClosed)?;

        let mut updates = vec![first];
        while let Ok(update) = self.rx.try_recv() {
            updates.push(update);
        }

        Ok(updates
            .into_iter()
            .filter_map(|u| u.into_message(&self.parser))
            .collect())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Content;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123456:test-token";

    #[test]
    fn test_webhook_url() {
        let adapter = Arc::new(TelegramAdapter::new(TOKEN));
        let source = WebhookUpdateSource::new(adapter, MessageParser::default(), 8443, "https://bot.example.com/");
        assert_eq!(source.webhook_url(), "https://bot.example.com/123456:test-token");
    }

    #[tokio::test]
    async fn test_posted_update_reaches_batch() {
        let api = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/setWebhook", TOKEN)))
            .and(body_partial_json(serde_json::json!({ "url": "https://bot.example.com/123456:test-token" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true, "result": true })))
            .expect(1)
            .mount(&api)
            .await;

        let adapter = Arc::new(TelegramAdapter::new(TOKEN).with_api_base(api.uri()));
        let mut source = WebhookUpdateSource::new(adapter, MessageParser::default(), 0, "https://bot.example.com");
        source.prepare().await.unwrap();

        let port = source.local_addr().unwrap().port();
        let client = reqwest::Client::new();
        let base = format!("http://127.0.0.1:{}", port);

        let health = client.get(format!("{}/health", base)).send().await.unwrap();
        assert_eq!(health.status(), reqwest::StatusCode::OK);

        let response = client
            .post(format!("{}/{}", base, TOKEN))
            .json(&serde_json::json!({
                "update_id": 1,
                "message": { "message_id": 3, "chat": { "id": 42 }, "text": "nasa" }
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let messages = source.next_batch().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].chat_id, 42);
        assert_eq!(messages[0].content, Content::Text("nasa".to_string()));
    }

    #[tokio::test]
    async fn test_wrong_path_is_rejected() {
        let (tx, _rx) = mpsc::channel(1);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router("secret", tx)).await;
        });

        let response = reqwest::Client::new()
            .post(format!("http://{}/guess", addr))
            .json(&serde_json::json!({ "update_id": 1 }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
