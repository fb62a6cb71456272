//! Whole-response cache for the site-wide post list
//!
//! Successful GET responses are stored per request URI (path + query) for
//! a fixed lifetime. Entries are not invalidated by writes; callers clear
//! the cache explicitly.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use moka::future::Cache;

use super::error::ApiError;
use super::server::AppState;

/// Upper bound on distinct cached URIs (one per page number)
const MAX_ENTRIES: u64 = 1024;

/// A response body captured for replay
#[derive(Debug, Clone)]
pub struct CachedResponse {
    content_type: Option<HeaderValue>,
    body: Bytes,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, self.body).into_response();
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

/// TTL cache of rendered responses; disabled when the TTL is zero
#[derive(Clone)]
pub struct ResponseCache {
    inner: Option<Cache<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        let inner = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build()
        });
        Self { inner }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        self.inner.as_ref()?.get(key).await
    }

    pub async fn insert(&self, key: String, value: CachedResponse) {
        if let Some(cache) = &self.inner {
            cache.insert(key, value).await;
        }
    }

    /// Drop every cached response.
    pub fn clear(&self) {
        if let Some(cache) = &self.inner {
            cache.invalidate_all();
            tracing::debug!("response cache cleared");
        }
    }
}

/// Middleware serving and filling the shared [`ResponseCache`].
pub async fn cache_page(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let cache = &state.index_cache;
    if request.method() != Method::GET || !cache.is_enabled() {
        return next.run(request).await;
    }

    let key = request.uri().to_string();
    if let Some(hit) = cache.get(&key).await {
        tracing::debug!(%key, "response cache hit");
        return hit.into_response();
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => return ApiError::internal(format!("buffering response: {e}")).into_response(),
    };

    cache
        .insert(
            key,
            CachedResponse {
                content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
                body: body.clone(),
            },
        )
        .await;

    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &'static str) -> CachedResponse {
        CachedResponse {
            content_type: Some(HeaderValue::from_static("application/json")),
            body: Bytes::from_static(text.as_bytes()),
        }
    }

    #[tokio::test]
    async fn stores_until_cleared() {
        let cache = ResponseCache::new(Duration::from_secs(20));
        cache.insert("/".into(), entry("first")).await;
        cache.insert("/".into(), entry("second")).await;

        let hit = cache.get("/").await.expect("cached");
        assert_eq!(hit.body, Bytes::from_static(b"second"));
        assert!(cache.get("/?page=2").await.is_none());

        cache.clear();
        assert!(cache.get("/").await.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_disables_cache() {
        let cache = ResponseCache::new(Duration::ZERO);
        assert!(!cache.is_enabled());
        cache.insert("/".into(), entry("ignored")).await;
        assert!(cache.get("/").await.is_none());
    }

    #[tokio::test]
    async fn replay_keeps_content_type() {
        let response = entry("{}").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }
}
