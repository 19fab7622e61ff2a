//! rural-search: holiday rental search for rural Andalusia
//!
//! A request goes through three stages, each with a deterministic fallback:
//! the query is rewritten for web search, results are fetched from a chain
//! of search APIs, and the raw results are turned into at most eight
//! listings.

pub mod config;
pub mod engines;
pub mod llm;
pub mod metrics;
pub mod network;
pub mod results;
pub mod search;
pub mod web;

pub use config::Settings;
pub use engines::Engine;
pub use results::{Listing, RawResult};
pub use search::{Search, SearchError, SearchRequest, SearchResponse};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for engine requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 5;

/// Maximum timeout that can be set
pub const MAX_TIMEOUT: u64 = 30;

/// Upper bound on listings in a response
pub const MAX_LISTINGS: usize = 8;
