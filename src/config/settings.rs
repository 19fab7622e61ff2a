//! Settings structures for rural-search configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub search: SearchSettings,
    pub llm: LlmSettings,
    pub engines: Vec<EngineConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            server: ServerSettings::default(),
            outgoing: OutgoingSettings::default(),
            search: SearchSettings::default(),
            llm: LlmSettings::default(),
            engines: default_engines(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings =
            serde_yaml::from_str(content).context("Failed to parse settings YAML")?;
        Ok(settings)
    }

    /// Merge with environment variables.
    ///
    /// Credential variables keep the names the deployment already uses
    /// (`GEMINI_API_KEY`, `SERPAPI_KEY`, ...); server knobs use the
    /// `RURAL_SEARCH_` prefix. Empty values are ignored.
    pub fn merge_env(&mut self) {
        self.merge_vars(|name| std::env::var(name).ok());
    }

    /// Merge overrides from an arbitrary variable source
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(val) = var("RURAL_SEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = var("RURAL_SEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("RURAL_SEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("GEMINI_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Some(val) = var("GOOGLE_MODEL") {
            self.llm.model = val;
        }
        if let Some(val) = var("SERPAPI_KEY") {
            self.engine_mut("serpapi").api_key = Some(val);
        }
        if let Some(val) = var("BING_SEARCH_KEY") {
            self.engine_mut("bing").api_key = Some(val);
        }
        if let Some(val) = var("BING_SEARCH_ENDPOINT") {
            self.engine_mut("bing").base_url = Some(val);
        }
    }

    /// Check values that would only fail later at bind time
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind_address
            .parse::<IpAddr>()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind_address))?;
        check_timeout("outgoing.request_timeout", self.outgoing.request_timeout)?;
        check_timeout("outgoing.max_request_timeout", self.outgoing.max_request_timeout)?;
        check_timeout("llm.timeout", self.llm.timeout)?;
        for engine in &self.engines {
            if let Some(timeout) = engine.timeout {
                check_timeout(&format!("engines.{}.timeout", engine.name), timeout)?;
            }
        }
        Ok(())
    }

    /// Get engine config by name
    pub fn get_engine(&self, name: &str) -> Option<&EngineConfig> {
        self.engines.iter().find(|e| e.name == name)
    }

    /// Get all enabled engines, in priority order
    pub fn enabled_engines(&self) -> Vec<&EngineConfig> {
        self.engines.iter().filter(|e| !e.disabled).collect()
    }

    /// Engine config by name, appended with defaults when missing
    fn engine_mut(&mut self, name: &str) -> &mut EngineConfig {
        let index = match self.engines.iter().position(|e| e.name == name) {
            Some(index) => index,
            None => {
                self.engines.push(EngineConfig {
                    name: name.to_string(),
                    engine: name.to_string(),
                    ..Default::default()
                });
                self.engines.len() - 1
            }
        };
        &mut self.engines[index]
    }

    /// Whether a language model credential is configured
    pub fn llm_enabled(&self) -> bool {
        self.llm.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Timeouts must be finite and positive to become a `Duration`
fn check_timeout(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        anyhow::bail!("{} must be a positive number of seconds, got {}", field, value);
    }
    Ok(())
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name reported by the health endpoint
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "Rural Search".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Upper bound for any per-engine timeout
    pub max_request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send with every request
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            max_request_timeout: crate::MAX_TIMEOUT as f64,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Search pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Listings returned per response (never more than 8)
    pub max_listings: usize,
    /// Results requested from each remote provider
    pub results_per_provider: u32,
    /// Interface language sent to providers
    pub language: String,
    /// Country code sent to providers
    pub country: String,
    /// Market code for providers that use one (Bing)
    pub market: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_listings: crate::MAX_LISTINGS,
            results_per_provider: 10,
            language: "es".to_string(),
            country: "es".to_string(),
            market: "es-ES".to_string(),
        }
    }
}

impl SearchSettings {
    /// Listing cap actually applied by the pipeline
    pub fn listing_limit(&self) -> usize {
        self.max_listings.clamp(1, crate::MAX_LISTINGS)
    }
}

/// Language model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// API key; the model is never called without one
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Base URL of the generative language API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: 20.0,
        }
    }
}

/// Individual search engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine name (unique identifier)
    pub name: String,
    /// Engine implementation to use
    pub engine: String,
    /// Whether engine is disabled
    pub disabled: bool,
    /// Custom timeout for this engine in seconds
    pub timeout: Option<f64>,
    /// API key if required
    pub api_key: Option<String>,
    /// Endpoint override
    pub base_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            engine: String::new(),
            disabled: false,
            timeout: None,
            api_key: None,
            base_url: None,
        }
    }
}

/// Default engine configurations, in fallback order
fn default_engines() -> Vec<EngineConfig> {
    vec![
        EngineConfig {
            name: "serpapi".to_string(),
            engine: "serpapi".to_string(),
            ..Default::default()
        },
        EngineConfig {
            name: "bing".to_string(),
            engine: "bing".to_string(),
            ..Default::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 3000);
        assert!(!settings.general.debug);
        assert!(!settings.llm_enabled());
        assert_eq!(settings.search.listing_limit(), 8);
        let names: Vec<_> = settings.engines.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["serpapi", "bing"]);
    }

    #[test]
    fn test_credentials_from_vars() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[
            ("GEMINI_API_KEY", "g-key"),
            ("GOOGLE_MODEL", "gemini-1.5-flash"),
            ("SERPAPI_KEY", "s-key"),
            ("BING_SEARCH_KEY", "b-key"),
            ("BING_SEARCH_ENDPOINT", "https://bing.example/v7.0/search"),
            ("RURAL_SEARCH_PORT", "8080"),
        ]));

        assert!(settings.llm_enabled());
        assert_eq!(settings.llm.model, "gemini-1.5-flash");
        assert_eq!(settings.get_engine("serpapi").unwrap().api_key.as_deref(), Some("s-key"));
        let bing = settings.get_engine("bing").unwrap();
        assert_eq!(bing.api_key.as_deref(), Some("b-key"));
        assert_eq!(bing.base_url.as_deref(), Some("https://bing.example/v7.0/search"));
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_empty_vars_are_unset() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[("GEMINI_API_KEY", ""), ("SERPAPI_KEY", "  ")]));
        assert!(!settings.llm_enabled());
        assert!(settings.get_engine("serpapi").unwrap().api_key.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
server:
  port: 9000
search:
  max_listings: 50
engines:
  - name: bing
    engine: bing
    timeout: 2.5
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.bind_address, "127.0.0.1");
        assert_eq!(settings.search.listing_limit(), 8);
        assert_eq!(settings.engines.len(), 1);
        assert_eq!(settings.engines[0].timeout, Some(2.5));
    }

    #[test]
    fn test_env_appends_missing_engine() {
        let mut settings = Settings::from_yaml("engines: []").unwrap();
        settings.merge_vars(vars(&[("SERPAPI_KEY", "s-key")]));
        assert_eq!(settings.engines.len(), 1);
        assert_eq!(settings.engines[0].engine, "serpapi");
    }

    #[test]
    fn test_validate_bind_address() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());
        settings.server.bind_address = "not-an-ip".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_timeouts() {
        for yaml in [
            "outgoing:\n  request_timeout: .nan",
            "outgoing:\n  request_timeout: 0",
            "outgoing:\n  max_request_timeout: .inf",
            "llm:\n  timeout: .nan",
            "llm:\n  timeout: -1",
            "engines:\n  - name: serpapi\n    engine: serpapi\n    timeout: .nan",
        ] {
            let settings = Settings::from_yaml(yaml).unwrap();
            assert!(settings.validate().is_err(), "{}", yaml);
        }

        let ok = Settings::from_yaml("engines:\n  - name: bing\n    engine: bing\n    timeout: 2.5").unwrap();
        assert!(ok.validate().is_ok());
    }
}
