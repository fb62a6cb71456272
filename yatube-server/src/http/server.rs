//! Axum server setup
//!
//! Router with:
//! - Same-origin CORS by default
//! - Tracing, request timeout and body limit
//! - CSRF checks on unsafe methods
//! - Response cache on the site-wide post list
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::cache::{cache_page, ResponseCache};
use super::csrf::csrf_protect;
use super::routes;
use crate::config::ServerConfig;
use crate::db::SessionRepo;
use crate::media::MediaStore;

/// How often expired sessions are deleted
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Shared application state
pub struct AppState {
    pub pool: SqlitePool,
    pub config: ServerConfig,
    /// Cache for `/`; see [`ResponseCache::clear`]
    pub index_cache: ResponseCache,
    pub media: MediaStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: ServerConfig) -> Self {
        Self {
            index_cache: ResponseCache::new(config.index_cache_ttl),
            media: MediaStore::new(&config.media_root),
            pool,
            config,
        }
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let port = config.bind_addr.port();
    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
    ]
    .iter()
    .filter_map(|origin| HeaderValue::from_str(origin).ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Build the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let index = Router::new()
        .route("/", get(routes::posts::index))
        .route_layer(middleware::from_fn_with_state(state.clone(), cache_page));

    Router::new()
        .merge(index)
        .merge(routes::posts::router())
        .merge(routes::comments::router())
        .merge(routes::profile::router())
        .merge(routes::auth::router())
        .merge(routes::health::router())
        .nest_service("/media", ServeDir::new(state.media.root()))
        .fallback(routes::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), csrf_protect))
        .layer(DefaultBodyLimit::max(state.config.body_limit))
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config.database_url).await?;
/// run_server(pool, config).await?;
/// ```
pub async fn run_server(pool: SqlitePool, config: ServerConfig) -> Result<(), ServerError> {
    tokio::fs::create_dir_all(&config.media_root).await?;
    tracing::info!(
        media_root = %config.media_root.display(),
        per_page = config.posts_per_page,
        cache_ttl_secs = config.index_cache_ttl.as_secs(),
        "configuration loaded"
    );

    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState::new(pool, config));
    let purge = tokio::spawn(purge_sessions(state.pool.clone()));
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn purge_sessions(pool: SqlitePool) {
    let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
    loop {
        interval.tick().await;
        match SessionRepo::new(&pool).purge_expired().await {
            Ok(0) => {}
            Ok(n) => tracing::info!(purged = n, "expired sessions removed"),
            Err(e) => tracing::warn!(error = %e, "session purge failed"),
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
