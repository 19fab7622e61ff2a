//! Engine traits and types

use crate::config::EngineConfig;
use crate::results::RawResult;
use serde::Serialize;
use std::collections::HashMap;

/// Parameters for building a search request
#[derive(Debug, Clone)]
pub struct RequestParams {
    /// Search query string (already enhanced)
    pub query: String,
    /// Interface language code
    pub lang: String,
    /// Country code
    pub country: String,
    /// Market code (language-region)
    pub market: String,
    /// Number of results to ask for
    pub count: u32,
}

impl RequestParams {
    /// Create new request parameters with Spanish defaults
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            lang: "es".to_string(),
            country: "es".to_string(),
            market: "es-ES".to_string(),
            count: 10,
        }
    }
}

/// HTTP request to be made by the engine
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: HashMap<String, String>,
    /// JSON body; a request with a body is sent as POST
    pub body: Option<serde_json::Value>,
}

impl EngineRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
        }
    }

    /// Create a POST request with a JSON body
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            body: Some(body),
            ..Self::get(url)
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// HTTP response from engine request
#[derive(Debug)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl EngineResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> anyhow::Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with the status and a short body excerpt unless 2xx
    pub fn error_for_status(&self) -> anyhow::Result<()> {
        if self.is_success() {
            return Ok(());
        }
        let excerpt: String = self.text.chars().take(200).collect();
        Err(anyhow::anyhow!("HTTP error {}: {}", self.status, excerpt))
    }
}

/// A remote search provider.
///
/// Engines only describe the request and parse the response; the search
/// executor owns the HTTP client, the timeout and the fallback order.
pub trait Engine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Short description of the engine
    fn about(&self) -> EngineAbout {
        EngineAbout::default()
    }

    /// Default timeout in seconds
    fn timeout(&self) -> f64 {
        crate::DEFAULT_TIMEOUT as f64
    }

    /// Build the HTTP request for a search
    fn request(&self, params: &RequestParams) -> anyhow::Result<EngineRequest>;

    /// Parse the HTTP response into raw results
    fn response(&self, response: EngineResponse) -> anyhow::Result<Vec<RawResult>>;

    /// Optional initialization (called once on startup)
    fn init(&mut self, _config: &EngineConfig) -> anyhow::Result<()> {
        Ok(())
    }

    /// Optional validation of configuration
    fn validate(&self, _config: &EngineConfig) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Engine metadata
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineAbout {
    /// Website URL
    pub website: Option<String>,
    /// Whether it uses the official API
    pub use_official_api: bool,
    /// Whether an API key is required
    pub require_api_key: bool,
}

impl EngineAbout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn website(mut self, url: impl Into<String>) -> Self {
        self.website = Some(url.into());
        self
    }

    pub fn official_api(mut self, uses: bool) -> Self {
        self.use_official_api = uses;
        self
    }

    pub fn api_key_required(mut self, required: bool) -> Self {
        self.require_api_key = required;
        self
    }
}

/// Read a required, non-empty API key from an engine config
pub(crate) fn required_key(config: &EngineConfig) -> anyhow::Result<String> {
    config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("engine {} requires an api_key", config.name))
}
