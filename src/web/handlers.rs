//! HTTP request handlers

use super::state::AppState;
use crate::search::{SearchError, SearchFilters, SearchRequest};
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::str::FromStr;
use tracing::error;
use url::form_urlencoded;

/// Query parameters for search
///
/// Everything arrives as text; values that are empty or do not parse are
/// treated as absent instead of rejecting the request.
#[derive(Debug, Default)]
pub struct SearchParams {
    /// Search query
    pub q: Option<String>,
    /// Number of guests
    pub guests: Option<String>,
    /// Minimum nightly price (`priceMin`)
    pub price_min: Option<String>,
    /// Maximum nightly price (`priceMax`)
    pub price_max: Option<String>,
    /// Preferred province
    pub location: Option<String>,
}

impl SearchParams {
    /// Read parameters from a raw query string.
    ///
    /// A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "q" => &mut params.q,
                "guests" => &mut params.guests,
                "priceMin" => &mut params.price_min,
                "priceMax" => &mut params.price_max,
                "location" => &mut params.location,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Convert into a search request
    pub fn into_request(self) -> SearchRequest {
        let filters = SearchFilters {
            guests: lenient(self.guests.as_deref()),
            price_min: lenient::<f64>(self.price_min.as_deref()).filter(|p| p.is_finite()),
            price_max: lenient::<f64>(self.price_max.as_deref()).filter(|p| p.is_finite()),
            location: self
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        };
        SearchRequest::new(self.q.unwrap_or_default()).with_filters(filters)
    }
}

fn lenient<T: FromStr>(value: Option<&str>) -> Option<T> {
    value.map(str::trim).filter(|v| !v.is_empty())?.parse().ok()
}

/// Search handler
pub async fn search(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, SearchError> {
    let request = SearchParams::from_query(query.as_deref()).into_request();
    let search = state.search.clone();

    // A panic inside a stage comes back as a JoinError
    let response = tokio::spawn(async move { search.handle(&request).await })
        .await
        .map_err(|e| SearchError::Internal(anyhow::Error::new(e).context("search task failed")))
        .and_then(|result| result)
        .map_err(|e| {
            if matches!(e, SearchError::Internal(_)) {
                state.metrics.inc_failed();
            }
            e
        })?;

    Ok(Json(response).into_response())
}

#[derive(Debug, Serialize)]
struct EngineInfo {
    name: String,
    #[serde(flatten)]
    about: crate::engines::EngineAbout,
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let engines: Vec<EngineInfo> = state
        .registry
        .ordered()
        .map(|e| EngineInfo {
            name: e.name().to_string(),
            about: e.about(),
        })
        .collect();

    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "instance": state.instance_name(),
        "engines": engines,
        "llm": state.settings.llm_enabled(),
    }))
}

/// Stats handler
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        match self {
            SearchError::InvalidRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            SearchError::Internal(e) => {
                error!("Search failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "Internal server error",
                        "message": "The search could not be completed",
                    })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> SearchParams {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        SearchParams::from_query(Some(&query))
    }

    #[test]
    fn test_params_are_parsed() {
        let request = params(&[
            ("q", "cortijo"),
            ("guests", "4"),
            ("priceMin", "80"),
            ("priceMax", "150.5"),
            ("location", " Granada "),
        ])
        .into_request();

        assert_eq!(request.query, "cortijo");
        assert_eq!(request.filters.guests, Some(4));
        assert_eq!(request.filters.price_min, Some(80.0));
        assert_eq!(request.filters.price_max, Some(150.5));
        assert_eq!(request.filters.location.as_deref(), Some("Granada"));
    }

    #[test]
    fn test_invalid_values_are_absent() {
        let request = params(&[
            ("q", "casa"),
            ("guests", "muchos"),
            ("priceMin", ""),
            ("priceMax", "NaN"),
            ("location", "  "),
        ])
        .into_request();

        assert!(request.filters.is_empty());
    }

    #[test]
    fn test_missing_query_is_empty() {
        assert!(params(&[("guests", "2")]).into_request().is_empty());
        assert!(SearchParams::from_query(None).into_request().is_empty());
    }

    #[test]
    fn test_repeated_keys_keep_first_value() {
        let request = params(&[
            ("q", "casa"),
            ("guests", "2"),
            ("guests", "3"),
            ("q", "otra"),
            ("sort", "price"),
        ])
        .into_request();
        assert_eq!(request.query, "casa");
        assert_eq!(request.filters.guests, Some(2));

        assert!(params(&[("q", ""), ("q", "")]).into_request().is_empty());
    }

    #[test]
    fn test_error_responses() {
        let response = SearchError::missing_query().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = SearchError::Internal(anyhow::anyhow!("secret cause")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
