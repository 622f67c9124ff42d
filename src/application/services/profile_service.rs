use crate::application::errors::LookupError;
use crate::domain::entities::ProfileSummary;
use crate::domain::traits::{ImageFetcher, PageFetcher, ProfileExtractor};

/// A found profile together with its picture
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub summary: ProfileSummary,
    pub image: Vec<u8>,
}

/// Resolves a handle to its profile picture.
///
/// Stateless apart from the fetchers it holds, so one instance can be
/// shared by every message handler.
pub struct ProfileService<P: PageFetcher, I: ImageFetcher> {
    pages: P,
    images: I,
    extractor: Box<dyn ProfileExtractor>,
}

impl<P: PageFetcher, I: ImageFetcher> ProfileService<P, I> {
    pub fn new(pages: P, images: I, extractor: impl ProfileExtractor + 'static) -> Self {
        Self {
            pages,
            images,
            extractor: Box::new(extractor),
        }
    }

    /// Fetch and scrape the profile page only.
    pub async fn resolve_profile(&self, handle: &str) -> Result<ProfileSummary, LookupError> {
        if handle.is_empty() {
            return Err(LookupError::NotFound(String::new()));
        }

        let body = self.pages
            .fetch_page(handle)
            .await
            .map_err(LookupError::Transport)?;

        let summary = self.extractor.extract_profile(&body)?;
        if !summary.is_resolved() {
            tracing::debug!("No complete profile metadata for {:?}: {:?}", handle, summary);
            return Err(LookupError::NotFound(handle.to_string()));
        }

        Ok(summary)
    }

    /// Resolve the profile and download its picture.
    pub async fn resolve_profile_image(&self, handle: &str) -> Result<ResolvedProfile, LookupError> {
        let summary = self.resolve_profile(handle).await?;
        tracing::info!("Serving {} Profile Picture", summary);

        match self.images.fetch_image(&summary.image_url).await {
            Ok(image) => Ok(ResolvedProfile { summary, image }),
            Err(source) => Err(LookupError::ImageTransport { summary, source }),
        }
    }
}
