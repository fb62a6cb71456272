//! yatube-server: a blog where users post, group posts, comment and follow
//! each other
//!
//! The crate exposes the storage layer (`db`), validated domain types
//! (`models`) and the axum application (`http`). Pages are served as JSON
//! context documents.

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod media;
pub mod models;

pub use config::{ConfigOverrides, ServerConfig};
pub use http::{build_router, run_server, AppState, ResponseCache, ServerError};
