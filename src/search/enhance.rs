//! Query enhancement
//!
//! Rewrites the user's query into something a web search engine will match
//! against rural rental pages, biased toward sierra and mountain properties.

use super::models::SearchFilters;
use crate::llm::LanguageModel;
use crate::metrics::EnhanceSource;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rewrites queries, through the language model when one is configured
pub struct QueryEnhancer {
    model: Option<Arc<dyn LanguageModel>>,
}

impl QueryEnhancer {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    /// Produce the enhanced query. Never fails.
    pub async fn enhance(&self, query: &str, filters: &SearchFilters) -> (String, EnhanceSource) {
        let model = match self.model {
            Some(ref model) => model,
            None => {
                info!("Language model not configured, using rule-based enhanced query");
                return (rule_based_query(query, filters), EnhanceSource::Rule);
            }
        };

        let prompt = build_prompt(query, filters);
        match model.generate(&prompt).await {
            Ok(answer) => match first_line(&answer) {
                Some(line) => {
                    debug!("Model {} rewrote query to: {}", model.name(), line);
                    (line, EnhanceSource::Model)
                }
                None => {
                    warn!("Model {} returned an empty query rewrite", model.name());
                    (model_fallback_query(query), EnhanceSource::ModelFallback)
                }
            },
            Err(e) => {
                warn!("Error enhancing search with {}: {:#}", model.name(), e);
                (model_fallback_query(query), EnhanceSource::ModelFallback)
            }
        }
    }
}

/// Deterministic query used when no model is configured
pub fn rule_based_query(query: &str, filters: &SearchFilters) -> String {
    let mut parts: Vec<String> = vec!["casa rural".to_string(), "alquiler".to_string()];

    if let Some(location) = filters.location.as_deref().map(str::trim) {
        if !location.is_empty() {
            parts.push(location.to_string());
        }
    }

    parts.push("sierra".to_string());
    parts.push(query.to_string());

    // A zero bound alone does not add the clause, but is printed when the other side is set
    let is_set = |p: Option<f64>| p.is_some_and(|p| p != 0.0);
    if is_set(filters.price_min) || is_set(filters.price_max) {
        parts.push(format!(
            "precio {}-{} por noche",
            filters.price_min.map(format_number).unwrap_or_default(),
            filters.price_max.map(format_number).unwrap_or_default()
        ));
    }

    if let Some(guests) = filters.guests.filter(|g| *g > 0) {
        parts.push(format!("para {} personas", guests));
    }

    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Query used when the model call fails
pub fn model_fallback_query(query: &str) -> String {
    format!("casa rural alquiler Andalucía {}", query)
}

/// Prompt asking the model for a single-line search query
pub fn build_prompt(query: &str, filters: &SearchFilters) -> String {
    let location = filters
        .location
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or("cualquiera en Andalucía");
    let guests = filters
        .guests
        .map(|g| g.to_string())
        .unwrap_or_else(|| "no especificado".to_string());
    let price_min = filters.price_min.map(format_number).unwrap_or_else(|| "-".to_string());
    let price_max = filters.price_max.map(format_number).unwrap_or_else(|| "-".to_string());

    format!(
        "Eres un experto en búsquedas de alojamientos rurales en Andalucía, España.\n\
         Analiza esta búsqueda del usuario: \"{query}\"\n\n\
         Ten en cuenta estas restricciones/opciones del usuario:\n\
         - Provincia o zona preferida: {location}\n\
         - Número de personas: {guests}\n\
         - Rango de precio por noche: {price_min} a {price_max}\n\n\
         Prioriza resultados que:\n\
         - Estén en la sierra o zonas montañosas y permitan actividades en el entorno \
         (senderismo, rutas, miradores, pueblos cercanos).\n\
         - Ofrezcan opciones y servicios para disfrutar tanto del alojamiento como del entorno.\n\
         Genera una consulta de búsqueda optimizada para Google que incluya:\n\
         - Términos relevantes para alquileres rurales en la sierra \
         (ej. \"casa rural sierra\", \"cortijo sierra\", \"alojamiento rural montaña\").\n\
         - La provincia o ciudad si está especificada.\n\
         - Filtro aproximado de precio y capacidad cuando sean relevantes.\n\n\
         Responde SOLO con la consulta optimizada (una sola línea), sin explicaciones adicionales."
    )
}

/// First non-empty line of a model answer, without wrapping quotes
fn first_line(answer: &str) -> Option<String> {
    answer
        .lines()
        .map(|l| l.trim().trim_matches('"').trim())
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Render a number the way a form would show it: `100`, not `100.0`
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
