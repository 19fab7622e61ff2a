//! Result type definitions

use serde::{Deserialize, Serialize};
use url::Url;

/// Maximum title length of a listing, in characters
pub const MAX_TITLE_CHARS: usize = 80;

/// Maximum description length of a listing, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 150;

/// Placeholder URL for listings without a link
pub const PLACEHOLDER_URL: &str = "#";

/// An unnormalised result as returned by a provider or the synthetic generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    /// Result title
    pub title: Option<String>,
    /// Snippet/description text
    pub snippet: Option<String>,
    /// Link to the page
    pub link: Option<String>,
    /// Provider that produced this result
    pub source: String,
    /// 1-based position in the provider's ranking
    pub position: Option<u32>,
}

impl RawResult {
    /// Create a new result from the given source
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = non_empty(snippet.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = non_empty(link.into());
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Whether there is anything worth structuring
    pub fn is_blank(&self) -> bool {
        self.title.is_none() && self.snippet.is_none() && self.link.is_none()
    }
}

/// A normalised listing as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
}

impl Listing {
    /// Create a listing, clamping title and description to their bounds
    pub fn new(
        id: impl Into<String>,
        title: &str,
        description: &str,
        url: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            title: truncate_chars(title.trim(), MAX_TITLE_CHARS),
            description: truncate_chars(description.trim(), MAX_DESCRIPTION_CHARS),
            url: canonical_url(url),
            price: None,
            location: None,
            bedrooms: None,
            image: None,
            amenities: None,
        }
    }
}

/// Truncate to at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Normalise a link; anything that is not an absolute http(s) URL is kept
/// verbatim, and a missing link becomes the placeholder.
pub fn canonical_url(link: Option<&str>) -> String {
    let link = match link.map(str::trim) {
        Some(l) if !l.is_empty() => l,
        _ => return PLACEHOLDER_URL.to_string(),
    };

    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => link.to_string(),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        let text = "Cortijo en Almería ".repeat(10);
        let truncated = truncate_chars(&text, 80);
        assert_eq!(truncated.chars().count(), 80);
        assert!(text.len() > truncated.len());
        assert_eq!(truncate_chars("Jaén", 80), "Jaén");
    }

    #[test]
    fn test_listing_bounds() {
        let listing = Listing::new("listing-1", &"á".repeat(200), &"é".repeat(400), None);
        assert_eq!(listing.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(listing.description.chars().count(), MAX_DESCRIPTION_CHARS);
        assert_eq!(listing.url, PLACEHOLDER_URL);
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(canonical_url(Some("https://Example.com")), "https://example.com/");
        assert_eq!(canonical_url(Some("  ")), "#");
        assert_eq!(canonical_url(Some("/relative/path")), "/relative/path");
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let listing = Listing::new("listing-1", "Casa", "Bonita", Some("https://a.es/x"));
        let json = serde_json::to_value(&listing).unwrap();
        assert!(json.get("price").is_none());
        assert!(json.get("amenities").is_none());
        assert_eq!(json["url"], "https://a.es/x");
    }

    #[test]
    fn test_raw_result_blank_fields() {
        let raw = RawResult::new("serpapi").with_title("  ").with_link("https://a.es");
        assert!(raw.title.is_none());
        assert!(!raw.is_blank());
        assert!(RawResult::new("bing").is_blank());
    }
}
