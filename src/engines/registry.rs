//! Engine registry holding the configured providers in fallback order

use super::traits::Engine;
use crate::config::EngineConfig;
use std::sync::Arc;

/// Ordered registry of configured search engines.
///
/// Registration order is priority order: the executor tries the first
/// engine, then the next one, and so on.
pub struct EngineRegistry {
    engines: Vec<(Arc<dyn Engine>, EngineConfig)>,
}

impl EngineRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            engines: Vec::new(),
        }
    }

    /// Register an engine after the ones already present.
    ///
    /// An engine registered twice under the same name replaces the earlier
    /// entry but keeps its position.
    pub fn register(&mut self, engine: Arc<dyn Engine>, config: EngineConfig) {
        let name = engine.name().to_string();
        match self.engines.iter_mut().find(|(e, _)| e.name() == name) {
            Some(slot) => *slot = (engine, config),
            None => self.engines.push((engine, config)),
        }
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Engine>> {
        self.engines
            .iter()
            .find(|(e, _)| e.name() == name)
            .map(|(e, _)| e)
    }

    /// Get engine config
    pub fn get_config(&self, name: &str) -> Option<&EngineConfig> {
        self.engines
            .iter()
            .find(|(e, _)| e.name() == name)
            .map(|(_, c)| c)
    }

    /// Engines in priority order
    pub fn ordered(&self) -> impl Iterator<Item = &Arc<dyn Engine>> {
        self.engines.iter().map(|(e, _)| e)
    }

    /// Get all engine names, in priority order
    pub fn names(&self) -> Vec<&str> {
        self.engines.iter().map(|(e, _)| e.name()).collect()
    }

    /// Check if an engine exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get number of registered engines
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Get effective timeout for an engine
    pub fn get_timeout(&self, name: &str, default: f64) -> f64 {
        self.get_config(name)
            .and_then(|c| c.timeout)
            .or_else(|| self.get(name).map(|e| e.timeout()))
            .unwrap_or(default)
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
