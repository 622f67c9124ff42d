//! Plain image download

use async_trait::async_trait;
use reqwest::Client;

use crate::application::errors::FetchError;
use crate::domain::traits::ImageFetcher;

/// Downloads images with a plain client; image hosts are not challenge-gated.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_image_buffers_body() {
        let server = MockServer::start().await;
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        Mock::given(method("GET"))
            .and(path("/x_s1080x1080.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg.clone()))
            .mount(&server)
            .await;

        let bytes = HttpImageFetcher::default()
            .fetch_image(&format!("{}/x_s1080x1080.jpg", server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, jpeg);
    }

    #[tokio::test]
    async fn test_fetch_image_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = HttpImageFetcher::default()
            .fetch_image(&format!("{}/x.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_image_bad_url() {
        let err = HttpImageFetcher::default().fetch_image("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
