//! Search orchestration module
//!
//! Runs the three stages of a search (query enhancement, retrieval,
//! structuring) and shapes the response envelope.

mod enhance;
mod error;
mod executor;
mod models;
mod retrieve;
mod structure;
pub mod synthetic;

pub use enhance::{model_fallback_query, rule_based_query, QueryEnhancer};
pub use error::SearchError;
pub use executor::Search;
pub use models::*;
pub use retrieve::{EngineFailure, Retriever};
pub use structure::{local_listings, ResultStructurer};
