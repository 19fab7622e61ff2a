//! Language model access
//!
//! The model is an optional collaborator: [`from_settings`] returns `None`
//! when no credential is configured, and callers branch on that instead of
//! probing the service.

mod gemini;

pub use gemini::Gemini;

use crate::config::Settings;
use crate::network::HttpClient;
use async_trait::async_trait;
use std::sync::Arc;

/// A text-in, text-out generation service
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model name, for logging
    fn name(&self) -> &str;

    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Build the configured model, if any
pub fn from_settings(settings: &Settings, client: HttpClient) -> Option<Arc<dyn LanguageModel>> {
    if !settings.llm_enabled() {
        tracing::info!("Language model not configured, using rule-based fallbacks");
        return None;
    }
    let model = Gemini::from_settings(&settings.llm, client)?;
    tracing::info!("Language model enabled: {}", model.name());
    Some(Arc::new(model))
}

/// Strip markdown code fences a model wraps around structured answers
pub fn strip_code_fences(text: &str) -> String {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static FENCE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"```(?:[A-Za-z0-9_-]+)?[ \t]*\r?\n?").expect("valid fence regex")
    });

    FENCE.replace_all(text.trim(), "").trim().to_string()
}
