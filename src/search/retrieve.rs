//! Result retrieval across the engine fallback chain

use super::synthetic;
use crate::config::Settings;
use crate::engines::{Engine, EngineRegistry, RequestParams};
use crate::metrics::Metrics;
use crate::network::HttpClient;
use crate::results::RawResult;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Tries each configured engine in order and falls back to synthetic data
pub struct Retriever {
    /// HTTP client for making requests
    client: HttpClient,
    /// Engines in priority order
    registry: Arc<EngineRegistry>,
    /// Shared counters
    metrics: Arc<Metrics>,
    /// Default timeout
    default_timeout: Duration,
    /// Maximum timeout
    max_timeout: Duration,
    /// Locale and count sent to every engine
    template: RequestParams,
}

/// Why an engine attempt did not produce results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFailure {
    Request(String),
    Network(String),
    Parse(String),
    Timeout,
    NoResults,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(client: HttpClient, registry: Arc<EngineRegistry>, metrics: Arc<Metrics>) -> Self {
        Self {
            client,
            registry,
            metrics,
            default_timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT),
            max_timeout: Duration::from_secs(crate::MAX_TIMEOUT),
            template: RequestParams::new(""),
        }
    }

    /// Apply outgoing timeouts and locale from settings
    pub fn configure(mut self, settings: &Settings) -> Self {
        self.default_timeout = Duration::from_secs_f64(settings.outgoing.request_timeout);
        self.max_timeout = Duration::from_secs_f64(
            settings
                .outgoing
                .max_request_timeout
                .max(settings.outgoing.request_timeout),
        );
        self.template = RequestParams {
            query: String::new(),
            lang: settings.search.language.clone(),
            country: settings.search.country.clone(),
            market: settings.search.market.clone(),
            count: settings.search.results_per_provider,
        };
        self
    }

    /// Fetch raw results for the enhanced query. Never fails.
    pub async fn retrieve(&self, query: &str) -> Vec<RawResult> {
        for engine in self.registry.ordered() {
            match self.search_engine(engine.as_ref(), query).await {
                Ok(results) => {
                    info!("Using {} for search ({} results)", engine.name(), results.len());
                    return results;
                }
                Err(failure) => {
                    warn!(
                        "Engine {} failed ({:?}), falling back to the next source",
                        engine.name(),
                        failure
                    );
                }
            }
        }

        info!("No external search engine available, returning synthetic results");
        self.metrics.record_synthetic();
        synthetic::generate()
    }

    /// Search a single engine under its timeout
    async fn search_engine(
        &self,
        engine: &dyn Engine,
        query: &str,
    ) -> Result<Vec<RawResult>, EngineFailure> {
        let engine_name = engine.name().to_string();
        let start = Instant::now();

        // Calculate timeout for this engine
        let engine_timeout = Duration::from_secs_f64(
            self.registry
                .get_timeout(&engine_name, self.default_timeout.as_secs_f64())
                .clamp(0.001, self.max_timeout.as_secs_f64()),
        );

        debug!(
            "Searching engine {} with timeout {:?}",
            engine_name, engine_timeout
        );

        let params = RequestParams {
            query: query.to_string(),
            ..self.template.clone()
        };

        let request = engine.request(&params).map_err(|e| {
            self.metrics.record_error(&engine_name);
            EngineFailure::Request(e.to_string())
        })?;

        // The client timeout covers the body read; the outer one covers everything else
        let result = timeout(
            engine_timeout,
            self.client.execute_with_timeout(request, engine_timeout),
        )
        .await;

        let elapsed = start.elapsed();

        let failure = match result {
            Ok(Ok(response)) => match engine.response(response) {
                Ok(results) if !results.is_empty() => {
                    self.metrics
                        .record_success(&engine_name, elapsed.as_millis() as u64);
                    debug!(
                        "Engine {} returned {} results in {:?}",
                        engine_name,
                        results.len(),
                        elapsed
                    );
                    return Ok(results);
                }
                Ok(_) => EngineFailure::NoResults,
                Err(e) => EngineFailure::Parse(format!("{:#}", e)),
            },
            Ok(Err(e)) => {
                if is_timeout(&e) {
                    EngineFailure::Timeout
                } else {
                    EngineFailure::Network(format!("{:#}", e))
                }
            }
            Err(_) => EngineFailure::Timeout,
        };

        self.metrics.record_error(&engine_name);
        Err(failure)
    }
}

fn is_timeout(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|e| e.downcast_ref::<reqwest::Error>())
        .any(|e| e.is_timeout())
}
