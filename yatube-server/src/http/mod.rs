//! HTTP server layer
//!
//! Axum server with:
//! - JSON context documents in place of rendered pages
//! - Cookie sessions and CSRF protection
//! - A TTL response cache on the site-wide post list
//! - Graceful shutdown

pub mod cache;
pub mod csrf;
pub mod error;
pub mod extractors;
pub mod forms;
pub mod redirect;
pub mod routes;
pub mod server;

pub use cache::ResponseCache;
pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerError};
