//! Search execution and orchestration

use super::enhance::QueryEnhancer;
use super::error::SearchError;
use super::models::{SearchRequest, SearchResponse};
use super::retrieve::Retriever;
use super::structure::ResultStructurer;
use crate::config::Settings;
use crate::engines::EngineRegistry;
use crate::llm::LanguageModel;
use crate::metrics::Metrics;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs enhance, retrieve and structure in sequence
///
/// Each stage absorbs its own failures, so a valid request always gets a
/// successful response.
pub struct Search {
    enhancer: QueryEnhancer,
    retriever: Retriever,
    structurer: ResultStructurer,
    metrics: Arc<Metrics>,
}

impl Search {
    /// Create a new search orchestrator from its stages
    pub fn new(
        enhancer: QueryEnhancer,
        retriever: Retriever,
        structurer: ResultStructurer,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            enhancer,
            retriever,
            structurer,
            metrics,
        }
    }

    /// Wire the stages from settings
    pub fn from_settings(
        settings: &Settings,
        client: crate::network::HttpClient,
        registry: Arc<EngineRegistry>,
        model: Option<Arc<dyn LanguageModel>>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let retriever = Retriever::new(client, registry, metrics.clone()).configure(settings);
        let structurer =
            ResultStructurer::new(model.clone()).with_limit(settings.search.listing_limit());
        Self::new(QueryEnhancer::new(model), retriever, structurer, metrics)
    }

    /// Shared counters
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Handle one search request
    pub async fn handle(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        self.metrics.inc_search();

        if request.is_empty() {
            self.metrics.inc_rejected();
            return Err(SearchError::missing_query());
        }

        let start = Instant::now();
        info!("Search request: {}", request.query);

        let (enhanced_query, enhance_source) =
            self.enhancer.enhance(&request.query, &request.filters).await;
        self.metrics.record_enhance(enhance_source);
        debug!("Enhanced query ({:?}): {}", enhance_source, enhanced_query);

        let raw = self.retriever.retrieve(&enhanced_query).await;

        let (results, structure_source) = self.structurer.structure(&raw, &request.query).await;
        self.metrics.record_structure(structure_source);

        info!(
            "Search '{}' produced {} listings from {} raw results in {:?}",
            request.query,
            results.len(),
            raw.len(),
            start.elapsed()
        );

        Ok(SearchResponse {
            success: true,
            query: request.query.clone(),
            enhanced_query,
            results,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::HttpClient;
    use crate::search::SearchFilters;

    fn offline_search() -> Search {
        let settings = Settings::default();
        Search::from_settings(
            &settings,
            HttpClient::new().unwrap(),
            Arc::new(EngineRegistry::new()),
            None,
            Arc::new(Metrics::new()),
        )
    }

    #[tokio::test]
    async fn test_offline_search_returns_eight_listings() {
        let search = offline_search();
        let response = search
            .handle(&SearchRequest::new("casa con piscina"))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.query, "casa con piscina");
        assert_eq!(
            response.enhanced_query,
            "casa rural alquiler sierra casa con piscina"
        );
        assert_eq!(response.results.len(), 8);

        let provinces: Vec<_> = response
            .results
            .iter()
            .map(|l| l.location.clone().unwrap())
            .collect();
        assert_eq!(
            provinces,
            ["Granada", "Málaga", "Sevilla", "Córdoba", "Cádiz", "Almería", "Jaén", "Huelva"]
        );
        assert_eq!(response.results[0].title, "Casa Rural en Granada - Alquiler Rural");
        assert_eq!(response.results[0].url, "https://ejemplo1.com/casa-rural-granada");
        assert!(response.timestamp.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_offline_search_is_idempotent() {
        let search = offline_search();
        let request = SearchRequest::new("cortijo").with_filters(
            SearchFilters::default()
                .with_guests(4)
                .with_location("Córdoba"),
        );
        let first = search.handle(&request).await.unwrap();
        let second = search.handle(&request).await.unwrap();
        assert_eq!(first.enhanced_query, second.enhanced_query);
        assert_eq!(first.results, second.results);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let search = offline_search();
        let err = search.handle(&SearchRequest::new("  ")).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidRequest(_)));
        assert_eq!(err.to_string(), "Query parameter \"q\" is required");

        let snapshot = search.metrics().snapshot();
        assert_eq!(snapshot.total_searches, 1);
        assert_eq!(snapshot.rejected_searches, 1);
    }

    #[tokio::test]
    async fn test_inverted_price_range_is_accepted() {
        let search = offline_search();
        let request = SearchRequest::new("finca").with_filters(
            SearchFilters::default().with_price_range(Some(100.0), Some(50.0)),
        );
        let response = search.handle(&request).await.unwrap();
        assert!(response.enhanced_query.contains("precio 100-50 por noche"));
        assert_eq!(response.results.len(), 8);
    }

    #[tokio::test]
    async fn test_stage_sources_are_counted() {
        let search = offline_search();
        search.handle(&SearchRequest::new("casa")).await.unwrap();

        let snapshot = search.metrics().snapshot();
        assert_eq!(snapshot.enhanced_by_rule, 1);
        assert_eq!(snapshot.structured_locally, 1);
        assert_eq!(snapshot.synthetic_retrievals, 1);
    }
}
