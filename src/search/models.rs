//! Search request and response models

use crate::results::Listing;
use serde::{Deserialize, Serialize};

/// Optional filters collected by the search form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Number of guests
    pub guests: Option<u32>,
    /// Minimum nightly price
    pub price_min: Option<f64>,
    /// Maximum nightly price; not required to be above `price_min`
    pub price_max: Option<f64>,
    /// Preferred province, passed through as given
    pub location: Option<String>,
}

impl SearchFilters {
    pub fn with_guests(mut self, guests: u32) -> Self {
        self.guests = Some(guests);
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Whether any filter is set
    pub fn is_empty(&self) -> bool {
        self.guests.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.location.is_none()
    }
}

/// A search as received from the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query; empty means absent
    pub query: String,
    /// Optional filters
    #[serde(default)]
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// Create a request without filters
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: SearchFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Check if query is empty
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
    }
}

/// Successful search envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub enhanced_query: String,
    pub results: Vec<Listing>,
    /// ISO-8601 UTC timestamp
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        assert!(SearchRequest::new("").is_empty());
        assert!(SearchRequest::new("   ").is_empty());
        assert!(!SearchRequest::new("ab").is_empty());
    }

    #[test]
    fn test_filters_builder() {
        let filters = SearchFilters::default()
            .with_guests(4)
            .with_price_range(Some(100.0), Some(50.0))
            .with_location("Granada");
        assert!(!filters.is_empty());
        assert_eq!(filters.price_min, Some(100.0));
        assert_eq!(filters.price_max, Some(50.0));
        assert!(SearchFilters::default().is_empty());
    }

    #[test]
    fn test_response_uses_camel_case() {
        let response = SearchResponse {
            success: true,
            query: "casa".to_string(),
            enhanced_query: "casa rural".to_string(),
            results: vec![],
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["enhancedQuery"], "casa rural");
        assert_eq!(json["success"], true);
    }
}
