use crate::application::errors::ExtractError;
use crate::domain::entities::ProfileSummary;

/// Turns a fetched profile page into a summary. An empty summary means
/// the page carried no profile metadata.
pub trait ProfileExtractor: Send + Sync {
    fn extract_profile(&self, body: &[u8]) -> Result<ProfileSummary, ExtractError>;
}
