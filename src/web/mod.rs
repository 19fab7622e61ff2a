//! Web server module
//!
//! JSON API over the search pipeline.

mod handlers;
mod routes;
mod state;

pub use handlers::SearchParams;
pub use routes::create_router;
pub use state::AppState;
