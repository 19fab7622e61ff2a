//! Bing Web Search API engine implementation

use super::traits::*;
use crate::config::EngineConfig;
use crate::results::RawResult;
use anyhow::{Context, Result as AnyhowResult};
use serde::Deserialize;

/// Bing Web Search (Azure Cognitive Services) engine.
///
/// Needs both a subscription key and the endpoint of the customer's
/// resource; there is no usable default endpoint.
pub struct Bing {
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    web_pages: Option<WebPages>,
}

#[derive(Debug, Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<WebPage>,
}

#[derive(Debug, Deserialize)]
struct WebPage {
    name: Option<String>,
    snippet: Option<String>,
    url: Option<String>,
}

impl Bing {
    pub fn new() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
        }
    }
}

impl Default for Bing {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Bing {
    fn name(&self) -> &str {
        "bing"
    }

    fn about(&self) -> EngineAbout {
        EngineAbout::new()
            .website("https://www.microsoft.com/bing/apis/bing-web-search-api")
            .official_api(true)
            .api_key_required(true)
    }

    fn init(&mut self, config: &EngineConfig) -> AnyhowResult<()> {
        self.api_key = required_key(config)?;
        self.endpoint = config
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("engine {} requires an endpoint", config.name))?;
        Ok(())
    }

    fn validate(&self, _config: &EngineConfig) -> AnyhowResult<()> {
        url::Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid Bing endpoint: {}", self.endpoint))?;
        Ok(())
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<EngineRequest> {
        Ok(EngineRequest::get(&self.endpoint)
            .param("q", params.query.clone())
            .param("mkt", params.market.clone())
            .param("count", params.count.to_string())
            .header("Ocp-Apim-Subscription-Key", self.api_key.clone()))
    }

    fn response(&self, response: EngineResponse) -> AnyhowResult<Vec<RawResult>> {
        response.error_for_status()?;

        let body: BingResponse = response.json().context("Failed to parse Bing response")?;

        let pages = body.web_pages.map(|w| w.value).unwrap_or_default();
        let results = pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| {
                let mut result = RawResult::new(self.name()).with_position(i as u32 + 1);
                if let Some(name) = page.name {
                    result = result.with_title(name);
                }
                if let Some(snippet) = page.snippet {
                    result = result.with_snippet(snippet);
                }
                if let Some(url) = page.url {
                    result = result.with_link(url);
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

    fn config(key: Option<&str>, endpoint: Option<&str>) -> EngineConfig {
        EngineConfig {
            name: "bing".to_string(),
            engine: "bing".to_string(),
            api_key: key.map(str::to_string),
            base_url: endpoint.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_bing_needs_key_and_endpoint() {
        let mut bing = Bing::new();
        assert!(bing.init(&config(Some("k"), None)).is_err());
        assert!(bing.init(&config(None, Some("https://api.bing.microsoft.com/v7.0/search"))).is_err());
        assert!(bing
            .init(&config(Some("k"), Some("https://api.bing.microsoft.com/v7.0/search")))
            .is_ok());
    }

    #[test]
    fn test_bing_request() {
        let mut bing = Bing::new();
        bing.init(&config(Some("k"), Some("https://api.bing.microsoft.com/v7.0/search")))
            .unwrap();
        let request = bing.request(&RequestParams::new("cortijo")).unwrap();

        assert_eq!(request.params["mkt"], "es-ES");
        assert_eq!(request.params["count"], "10");
        assert_eq!(request.headers["Ocp-Apim-Subscription-Key"], "k");
    }

    #[test]
    fn test_bing_response() {
        let bing = Bing::new();
        let text = r#"{"_type": "SearchResponse", "webPages": {"value": [
            {"name": "Finca en Huelva", "url": "https://b.es/1", "snippet": "Cerca de Doñana"},
            {"name": "Villa en Cádiz", "url": "https://b.es/2"}
        ]}}"#;
        let results = bing
            .response(EngineResponse {
                status: 200,
                text: text.to_string(),
                url: String::new(),
            })
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title.as_deref(), Some("Finca en Huelva"));
        assert_eq!(results[0].link.as_deref(), Some("https://b.es/1"));
        assert_eq!(results[1].position, Some(2));
    }

    #[test]
    fn test_bing_response_without_web_pages() {
        let results = Bing::new()
            .response(EngineResponse {
                status: 200,
                text: r#"{"_type": "SearchResponse"}"#.to_string(),
                url: String::new(),
            })
            .unwrap();
        assert!(results.is_empty());
    }
}
