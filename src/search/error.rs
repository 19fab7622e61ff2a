//! Errors that can reach the client

use thiserror::Error;

/// Failures visible outside the search pipeline.
///
/// Provider and model failures never show up here; the stages absorb them.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request cannot be served (missing query)
    #[error("{0}")]
    InvalidRequest(String),

    /// Anything unexpected that escaped the stages
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SearchError {
    pub fn missing_query() -> Self {
        SearchError::InvalidRequest("Query parameter \"q\" is required".to_string())
    }
}
