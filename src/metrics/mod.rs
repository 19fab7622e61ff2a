//! Metrics collection module
//!
//! Tracks which stage produced the data for each search and how the remote
//! engines behave. Counters are observational; nothing reads them to make
//! decisions.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Response times kept per engine for the rolling average
const RESPONSE_TIME_WINDOW: usize = 100;

/// Process-wide metrics collector
pub struct Metrics {
    total_searches: AtomicU64,
    rejected_searches: AtomicU64,
    failed_searches: AtomicU64,
    enhanced_by_model: AtomicU64,
    enhanced_by_rule: AtomicU64,
    enhance_fallbacks: AtomicU64,
    structured_by_model: AtomicU64,
    structured_locally: AtomicU64,
    synthetic_retrievals: AtomicU64,
    engines: RwLock<HashMap<String, EngineCounters>>,
}

#[derive(Debug, Default, Clone)]
struct EngineCounters {
    successes: u64,
    errors: u64,
    response_times: Vec<u64>,
}

/// Where the enhanced query came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhanceSource {
    Model,
    Rule,
    ModelFallback,
}

/// Where the listings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureSource {
    Model,
    Local,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_searches: AtomicU64::new(0),
            rejected_searches: AtomicU64::new(0),
            failed_searches: AtomicU64::new(0),
            enhanced_by_model: AtomicU64::new(0),
            enhanced_by_rule: AtomicU64::new(0),
            enhance_fallbacks: AtomicU64::new(0),
            structured_by_model: AtomicU64::new(0),
            structured_locally: AtomicU64::new(0),
            synthetic_retrievals: AtomicU64::new(0),
            engines: RwLock::new(HashMap::new()),
        }
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a request rejected for a missing query
    pub fn inc_rejected(&self) {
        self.rejected_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a request that ended in an internal error
    pub fn inc_failed(&self) {
        self.failed_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enhance(&self, source: EnhanceSource) {
        let counter = match source {
            EnhanceSource::Model => &self.enhanced_by_model,
            EnhanceSource::Rule => &self.enhanced_by_rule,
            EnhanceSource::ModelFallback => &self.enhance_fallbacks,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_structure(&self, source: StructureSource) {
        let counter = match source {
            StructureSource::Model => &self.structured_by_model,
            StructureSource::Local => &self.structured_locally,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_synthetic(&self) {
        self.synthetic_retrievals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful engine call and its response time
    pub fn record_success(&self, engine: &str, time_ms: u64) {
        self.with_engine(engine, |c| {
            c.successes += 1;
            if c.response_times.len() >= RESPONSE_TIME_WINDOW {
                c.response_times.remove(0);
            }
            c.response_times.push(time_ms);
        });
    }

    /// Record a failed engine call
    pub fn record_error(&self, engine: &str) {
        self.with_engine(engine, |c| c.errors += 1);
    }

    fn with_engine(&self, engine: &str, update: impl FnOnce(&mut EngineCounters)) {
        let mut engines = self.engines.write().unwrap_or_else(|e| e.into_inner());
        update(engines.entry(engine.to_string()).or_default());
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        let engines = self.engines.read().unwrap_or_else(|e| e.into_inner());
        let engines = engines
            .iter()
            .map(|(name, c)| {
                (
                    name.clone(),
                    EngineStats {
                        successes: c.successes,
                        errors: c.errors,
                        avg_response_time: average(&c.response_times),
                        reliability: reliability(c),
                    },
                )
            })
            .collect();

        MetricsSnapshot {
            total_searches: self.total_searches.load(Ordering::Relaxed),
            rejected_searches: self.rejected_searches.load(Ordering::Relaxed),
            failed_searches: self.failed_searches.load(Ordering::Relaxed),
            enhanced_by_model: self.enhanced_by_model.load(Ordering::Relaxed),
            enhanced_by_rule: self.enhanced_by_rule.load(Ordering::Relaxed),
            enhance_fallbacks: self.enhance_fallbacks.load(Ordering::Relaxed),
            structured_by_model: self.structured_by_model.load(Ordering::Relaxed),
            structured_locally: self.structured_locally.load(Ordering::Relaxed),
            synthetic_retrievals: self.synthetic_retrievals.load(Ordering::Relaxed),
            engines,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn average(times: &[u64]) -> Option<u64> {
    if times.is_empty() {
        None
    } else {
        Some(times.iter().sum::<u64>() / times.len() as u64)
    }
}

fn reliability(c: &EngineCounters) -> f64 {
    let total = c.successes + c.errors;
    if total == 0 {
        100.0
    } else {
        (c.successes as f64 / total as f64) * 100.0
    }
}

/// Serializable view of the metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_searches: u64,
    pub rejected_searches: u64,
    pub failed_searches: u64,
    pub enhanced_by_model: u64,
    pub enhanced_by_rule: u64,
    pub enhance_fallbacks: u64,
    pub structured_by_model: u64,
    pub structured_locally: u64,
    pub synthetic_retrievals: u64,
    pub engines: HashMap<String, EngineStats>,
}

/// Statistics for a single engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub successes: u64,
    pub errors: u64,
    pub avg_response_time: Option<u64>,
    pub reliability: f64,
}
