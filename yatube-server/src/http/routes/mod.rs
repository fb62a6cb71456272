//! Route handlers organized by resource

pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;
pub mod profile;

use axum::http::Uri;

use super::error::ApiError;

/// Fallback for unmatched paths.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NoRoute {
        path: uri.path().to_owned(),
    }
}
