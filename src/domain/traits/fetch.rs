use async_trait::async_trait;
use crate::application::errors::FetchError;

/// Fetches the rendered profile page for a handle
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, handle: &str) -> Result<Vec<u8>, FetchError>;
}

/// Downloads an image, fully buffered
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
