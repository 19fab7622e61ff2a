//! Result types and the fixed catalogs behind fallback data

mod catalog;
mod types;

pub use catalog::*;
pub use types::*;
