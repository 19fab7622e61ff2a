//! HTTP networking module
//!
//! Provides the HTTP client used for provider and language model requests.

mod client;

pub use client::HttpClient;
