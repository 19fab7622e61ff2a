//! Application state shared across handlers

use crate::config::Settings;
use crate::engines::EngineRegistry;
use crate::llm::LanguageModel;
use crate::metrics::Metrics;
use crate::network::HttpClient;
use crate::search::Search;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Engine registry
    pub registry: Arc<EngineRegistry>,
    /// Search orchestrator
    pub search: Arc<Search>,
    /// Process-wide counters
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        settings: Settings,
        registry: EngineRegistry,
        client: HttpClient,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> Self {
        let settings = Arc::new(settings);
        let registry = Arc::new(registry);
        let metrics = Arc::new(Metrics::new());
        let search = Arc::new(Search::from_settings(
            &settings,
            client,
            registry.clone(),
            model,
            metrics.clone(),
        ));

        Self {
            settings,
            registry,
            search,
            metrics,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
