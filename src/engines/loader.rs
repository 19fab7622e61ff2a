//! Engine loader for initializing engines from configuration

use super::registry::EngineRegistry;
use super::traits::Engine;
use super::{bing, serpapi};
use crate::config::{EngineConfig, Settings};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing engines from configuration
pub struct EngineLoader;

impl EngineLoader {
    /// Load all usable engines from settings, keeping their configured order.
    ///
    /// Engines without credentials fail `init` and are skipped, so a
    /// deployment without any keys ends up with an empty registry.
    pub fn load(settings: &Settings) -> EngineRegistry {
        let mut registry = EngineRegistry::new();

        for config in settings.enabled_engines() {
            match Self::create_engine(&config.engine, config) {
                Ok(engine) => {
                    info!("Loaded engine: {} ({})", config.name, config.engine);
                    registry.register(engine, config.clone());
                }
                Err(e) => {
                    info!("Engine {} not available: {}", config.name, e);
                }
            }
        }

        if registry.is_empty() {
            warn!("No search engine configured, searches will use synthetic results");
        }
        registry
    }

    /// Create an engine instance by name
    fn create_engine(engine_type: &str, config: &EngineConfig) -> Result<Arc<dyn Engine>> {
        let mut engine: Box<dyn Engine> = match engine_type {
            "serpapi" => Box::new(serpapi::SerpApi::new()),
            "bing" => Box::new(bing::Bing::new()),
            _ => {
                return Err(anyhow::anyhow!("Unknown engine type: {}", engine_type));
            }
        };

        // Initialize the engine
        engine.init(config)?;

        // Validate configuration
        engine.validate(config)?;

        Ok(Arc::from(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credentials_no_engines() {
        let registry = EngineLoader::load(&Settings::default());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_loads_configured_engines_in_order() {
        let mut settings = Settings::default();
        settings.merge_vars(|name| match name {
            "SERPAPI_KEY" => Some("s".to_string()),
            "BING_SEARCH_KEY" => Some("b".to_string()),
            "BING_SEARCH_ENDPOINT" => Some("https://api.bing.microsoft.com/v7.0/search".to_string()),
            _ => None,
        });

        let registry = EngineLoader::load(&settings);
        assert_eq!(registry.names(), vec!["serpapi", "bing"]);
    }

    #[test]
    fn test_bing_without_endpoint_is_skipped() {
        let mut settings = Settings::default();
        settings.merge_vars(|name| (name == "BING_SEARCH_KEY").then(|| "b".to_string()));

        let registry = EngineLoader::load(&settings);
        assert!(!registry.contains("bing"));
    }

    #[test]
    fn test_disabled_and_unknown_engines_are_skipped() {
        let mut settings = Settings::default();
        settings.engines[0].api_key = Some("s".to_string());
        settings.engines[0].disabled = true;
        settings.engines.push(EngineConfig {
            name: "yahoo".to_string(),
            engine: "yahoo".to_string(),
            api_key: Some("y".to_string()),
            ..Default::default()
        });

        let registry = EngineLoader::load(&settings);
        assert!(registry.is_empty());
    }
}
