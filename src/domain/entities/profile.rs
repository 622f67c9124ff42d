use std::fmt;

/// Metadata scraped from a profile page.
///
/// Fields are only ever filled in by the metadata extractor; a summary
/// that is not fully resolved means the profile could not be found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSummary {
    pub display_name: String,
    pub handle: String,
    pub image_url: String,
}

impl ProfileSummary {
    /// All three fields are present.
    pub fn is_resolved(&self) -> bool {
        !self.display_name.is_empty() && !self.handle.is_empty() && !self.image_url.is_empty()
    }

    /// Nothing matched on the page.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_empty() && self.handle.is_empty() && self.image_url.is_empty()
    }
}

impl fmt::Display for ProfileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (@{})", self.display_name, self.handle)
    }
}
