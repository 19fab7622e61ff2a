//! SerpApi (Google results) engine implementation

use super::traits::*;
use crate::config::EngineConfig;
use crate::results::RawResult;
use anyhow::{Context, Result as AnyhowResult};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://serpapi.com/search";

/// Google web results through the SerpApi JSON API
pub struct SerpApi {
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
    position: Option<u32>,
}

impl SerpApi {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
        }
    }
}

impl Default for SerpApi {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for SerpApi {
    fn name(&self) -> &str {
        "serpapi"
    }

    fn about(&self) -> EngineAbout {
        EngineAbout::new()
            .website("https://serpapi.com")
            .official_api(true)
            .api_key_required(true)
    }

    fn init(&mut self, config: &EngineConfig) -> AnyhowResult<()> {
        self.api_key = required_key(config)?;
        if let Some(ref url) = config.base_url {
            self.base_url = url.clone();
        }
        Ok(())
    }

    fn validate(&self, _config: &EngineConfig) -> AnyhowResult<()> {
        url::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid SerpApi URL: {}", self.base_url))?;
        Ok(())
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<EngineRequest> {
        Ok(EngineRequest::get(&self.base_url)
            .param("q", params.query.clone())
            .param("api_key", self.api_key.clone())
            .param("engine", "google")
            .param("gl", params.country.clone())
            .param("hl", params.lang.clone())
            .param("num", params.count.to_string()))
    }

    fn response(&self, response: EngineResponse) -> AnyhowResult<Vec<RawResult>> {
        response.error_for_status()?;

        let body: SerpApiResponse = response
            .json()
            .context("Failed to parse SerpApi response")?;

        if let Some(error) = body.error {
            anyhow::bail!("SerpApi error: {}", error);
        }

        let results = body
            .organic_results
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let mut result = RawResult::new(self.name())
                    .with_position(r.position.unwrap_or(i as u32 + 1));
                if let Some(title) = r.title {
                    result = result.with_title(title);
                }
                if let Some(snippet) = r.snippet {
                    result = result.with_snippet(snippet);
                }
                if let Some(link) = r.link {
                    result = result.with_link(link);
                }
                result
            })
            .filter(|r| !r.is_blank())
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SerpApi {
        let mut engine = SerpApi::new();
        engine
            .init(&EngineConfig {
                name: "serpapi".to_string(),
                engine: "serpapi".to_string(),
                api_key: Some("secret".to_string()),
                ..Default::default()
            })
            .unwrap();
        engine
    }

    #[test]
    fn test_serpapi_request() {
        let request = configured()
            .request(&RequestParams::new("casa rural sierra"))
            .unwrap();

        assert!(request.url.contains("serpapi.com"));
        assert_eq!(request.params["q"], "casa rural sierra");
        assert_eq!(request.params["api_key"], "secret");
        assert_eq!(request.params["engine"], "google");
        assert_eq!(request.params["gl"], "es");
        assert_eq!(request.params["hl"], "es");
        assert_eq!(request.params["num"], "10");
    }

    #[test]
    fn test_init_requires_key() {
        let mut engine = SerpApi::new();
        assert!(engine.init(&EngineConfig::default()).is_err());
    }

    #[test]
    fn test_serpapi_response() {
        let text = r#"{
            "search_metadata": {"status": "Success"},
            "organic_results": [
                {"position": 1, "title": "Cortijo en Granada", "snippet": "Vistas a Sierra Nevada", "link": "https://a.es/1"},
                {"position": 2, "title": "Casa en Jaén", "link": "https://a.es/2"},
                {"position": 3}
            ]
        }"#;
        let results = configured()
            .response(EngineResponse {
                status: 200,
                text: text.to_string(),
                url: DEFAULT_BASE_URL.to_string(),
            })
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title.as_deref(), Some("Cortijo en Granada"));
        assert_eq!(results[1].snippet, None);
        assert_eq!(results[1].position, Some(2));
        assert_eq!(results[0].source, "serpapi");
    }

    #[test]
    fn test_serpapi_error_body() {
        let result = configured().response(EngineResponse {
            status: 200,
            text: r#"{"error": "Invalid API key."}"#.to_string(),
            url: DEFAULT_BASE_URL.to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_serpapi_http_error() {
        let result = configured().response(EngineResponse {
            status: 429,
            text: "quota exceeded".to_string(),
            url: DEFAULT_BASE_URL.to_string(),
        });
        let err = result.unwrap_err().to_string();
        assert!(err.contains("429"));
    }
}
