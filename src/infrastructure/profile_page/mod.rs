//! Profile page fetching and scraping

pub mod extractor;

use async_trait::async_trait;

use crate::application::errors::FetchError;
use crate::domain::traits::PageFetcher;
use crate::infrastructure::challenge::ChallengeClient;

pub use extractor::MetadataExtractor;

/// Fetches `<base_url>/<handle>` through the challenge-solving client
pub struct HttpPageFetcher {
    client: ChallengeClient,
    base_url: String,
}

impl HttpPageFetcher {
    pub fn new(client: ChallengeClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// The handle goes into the path verbatim, no escaping.
    pub fn profile_url(&self, handle: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), handle)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, handle: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.profile_url(handle);
        tracing::debug!("Fetching profile page {}", url);

        let response = self.client.get(&url).await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(base_url: &str) -> HttpPageFetcher {
        let client = ChallengeClient::new("test-agent", Duration::ZERO).unwrap();
        HttpPageFetcher::new(client, base_url)
    }

    #[test]
    fn test_profile_url_is_plain_concatenation() {
        let fetcher = fetcher("https://instagram.com/");
        assert_eq!(fetcher.profile_url("nasa"), "https://instagram.com/nasa");
        assert_eq!(fetcher.profile_url("a b?c"), "https://instagram.com/a b?c");
    }

    #[tokio::test]
    async fn test_fetch_page_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nasa"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nasa</html>"))
            .mount(&server)
            .await;

        let body = fetcher(&server.uri()).fetch_page("nasa").await.unwrap();
        assert_eq!(body, b"<html>nasa</html>".to_vec());
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher(&server.uri()).fetch_page("ghost").await.unwrap_err();
        match err {
            FetchError::Status { status, url } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/ghost"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let err = fetcher("http://127.0.0.1:1").fetch_page("nasa").await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
