//! Open Graph metadata extraction from a profile page.
//!
//! The target markup keys its `<meta>` tags by attribute *value*
//! (`og:image`, `og:title`) rather than by `property`, so matching looks
//! at every attribute value on the tag and then reads `content`.

use scraper::Html;

use crate::application::errors::ExtractError;
use crate::domain::entities::ProfileSummary;
use crate::domain::traits::ProfileExtractor;

const OG_IMAGE: &str = "og:image";
const OG_TITLE: &str = "og:title";
const CONTENT: &str = "content";

/// Size token of the thumbnail served in `og:image`
pub const LOW_RES_TOKEN: &str = "s150x150";
/// Size token of the full resolution picture
pub const HIGH_RES_TOKEN: &str = "s1080x1080";

const TITLE_SEPARATOR: &str = " (@";

/// Walks a document and fills in a `ProfileSummary`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Decode raw page bytes (lossy) and extract.
    pub fn extract_from_bytes(&self, body: &[u8]) -> Result<ProfileSummary, ExtractError> {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);
        self.extract(&document)
    }

    /// Pre-order walk over every node; every matching tag overwrites the
    /// previous value, so the last one in document order wins.
    pub fn extract(&self, document: &Html) -> Result<ProfileSummary, ExtractError> {
        let mut summary = ProfileSummary::default();

        for node in document.tree.root().descendants() {
            let Some(element) = node.value().as_element() else {
                continue;
            };
            if element.name() != "meta" {
                continue;
            }

            let attrs: Vec<(&str, &str)> = element.attrs().collect();
            apply_meta(&attrs, &mut summary)?;
        }

        Ok(summary)
    }
}

impl ProfileExtractor for MetadataExtractor {
    fn extract_profile(&self, body: &[u8]) -> Result<ProfileSummary, ExtractError> {
        self.extract_from_bytes(body)
    }
}

fn apply_meta(attrs: &[(&str, &str)], summary: &mut ProfileSummary) -> Result<(), ExtractError> {
    for (_, value) in attrs {
        if *value == OG_IMAGE {
            for (key, content) in attrs {
                if *key == CONTENT {
                    summary.image_url = upscale_image_url(content);
                }
            }
        }

        if *value == OG_TITLE {
            for (key, content) in attrs {
                if *key == CONTENT {
                    let (display_name, handle) = split_title(content)?;
                    summary.display_name = display_name;
                    summary.handle = handle;
                }
            }
        }
    }
    Ok(())
}

/// Swap the first thumbnail size token for the full size one.
pub fn upscale_image_url(url: &str) -> String {
    url.replacen(LOW_RES_TOKEN, HIGH_RES_TOKEN, 1)
}

/// Split `"Display Name (@handle) ..."` into name and handle.
pub fn split_title(content: &str) -> Result<(String, String), ExtractError> {
    let mut parts = content.split(TITLE_SEPARATOR);
    let display_name = parts.next().unwrap_or_default();
    let rest = parts
        .next()
        .ok_or_else(|| ExtractError::UnexpectedTitle(content.to_string()))?;
    let handle = rest.split(')').next().unwrap_or_default();

    Ok((display_name.to_string(), handle.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Result<ProfileSummary, ExtractError> {
        MetadataExtractor::new().extract(&Html::parse_document(html))
    }

    #[test]
    fn test_nasa_fixture() {
        let html = r#"<html><head>
            <meta value="og:title" content="NASA (@nasa)">
            <meta value="og:image" content="https://img/x_s150x150.jpg">
            </head><body></body></html>"#;

        let summary = extract(html).unwrap();
        assert_eq!(summary.display_name, "NASA");
        assert_eq!(summary.handle, "nasa");
        assert_eq!(summary.image_url, "https://img/x_s1080x1080.jpg");
        assert!(summary.is_resolved());
    }

    #[test]
    fn test_image_token_replaced_once() {
        let html = r#"<meta value="og:image" content="https://cdn/s150x150/a_s150x150.jpg?x=1">"#;
        let summary = extract(html).unwrap();
        assert_eq!(summary.image_url, "https://cdn/s1080x1080/a_s150x150.jpg?x=1");
    }

    #[test]
    fn test_image_without_token_is_unchanged() {
        let html = r#"<meta value="og:image" content="https://cdn/a.jpg">"#;
        assert_eq!(extract(html).unwrap().image_url, "https://cdn/a.jpg");
    }

    #[test]
    fn test_title_split() {
        let html = r#"<meta value="og:title" content="Jane Doe (@janedoe) &bull; Instagram photos and videos">"#;
        let summary = extract(html).unwrap();
        assert_eq!(summary.display_name, "Jane Doe");
        assert_eq!(summary.handle, "janedoe");
    }

    #[test]
    fn test_matches_on_any_attribute_value() {
        let html = r#"<meta property="og:title" content="Jane Doe (@janedoe)">"#;
        assert_eq!(extract(html).unwrap().handle, "janedoe");
    }

    #[test]
    fn test_attribute_key_alone_does_not_match() {
        let html = r#"<meta og:image="x" content="https://cdn/a.jpg">"#;
        assert!(extract(html).unwrap().is_empty());
    }

    #[test]
    fn test_no_meta_tags_yields_empty_summary() {
        let html = r#"<html><head><title>Page Not Found</title>
            <meta name="description" content="nothing here"></head></html>"#;
        let summary = extract(html).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary, ProfileSummary::default());
    }

    #[test]
    fn test_missing_separator_fails() {
        let html = r#"<meta value="og:title" content="Jane Doe">"#;
        assert_eq!(
            extract(html),
            Err(ExtractError::UnexpectedTitle("Jane Doe".to_string()))
        );
    }

    #[test]
    fn test_last_match_wins() {
        let html = r#"<html><head>
            <meta value="og:title" content="First (@first)">
            <meta value="og:image" content="https://img/first_s150x150.jpg">
            </head><body><div>
            <meta value="og:image" content="https://img/second_s150x150.jpg">
            <meta value="og:title" content="Second (@second)">
            </div></body></html>"#;

        let summary = extract(html).unwrap();
        assert_eq!(summary.display_name, "Second");
        assert_eq!(summary.handle, "second");
        assert_eq!(summary.image_url, "https://img/second_s1080x1080.jpg");
    }

    #[test]
    fn test_meta_without_content_leaves_field_empty() {
        let html = r#"<meta value="og:image">"#;
        assert!(extract(html).unwrap().is_empty());
    }

    #[test]
    fn test_extract_from_bytes() {
        let body = br#"<meta value="og:title" content="NASA (@nasa)">"#;
        let summary = MetadataExtractor::new().extract_from_bytes(body).unwrap();
        assert_eq!(summary.handle, "nasa");
        assert!(summary.image_url.is_empty());
    }

    #[test]
    fn test_split_title_handle_stops_at_paren() {
        assert_eq!(
            split_title("A (@b) (@c)").unwrap(),
            ("A".to_string(), "b".to_string())
        );
        assert_eq!(
            split_title("A (@b").unwrap(),
            ("A".to_string(), "b".to_string())
        );
    }
}
