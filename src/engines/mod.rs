//! Search engine module
//!
//! Defines the Engine trait and the ordered registry of remote providers.

mod loader;
mod registry;
mod traits;

// Engine implementations
pub mod bing;
pub mod serpapi;

pub use loader::EngineLoader;
pub use registry::EngineRegistry;
pub use traits::*;
