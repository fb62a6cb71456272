//! Server configuration - defaults and environment loading
//!
//! Configuration is loaded from environment variables:
//! - `DATABASE_URL`: SQLite URL (default: sqlite://yatube.db)
//! - `YATUBE_BIND`: listen address (default: 127.0.0.1:8000)
//! - `YATUBE_MEDIA_ROOT`: upload directory (default: ./media)
//! - `YATUBE_POSTS_PER_PAGE`: page size for post lists (default: 10)
//! - `YATUBE_INDEX_CACHE_SECONDS`: index page cache lifetime (default: 20)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::models::DEFAULT_PER_PAGE;

/// Index page cache lifetime
pub const DEFAULT_INDEX_CACHE_SECONDS: u64 = 20;

/// Largest accepted request body (image uploads)
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    pub database_url: String,

    /// Directory uploaded images are written to and served from
    pub media_root: PathBuf,

    pub posts_per_page: u32,

    /// Lifetime of cached index responses; zero disables the cache
    pub index_cache_ttl: Duration,

    /// Reject unsafe requests without a matching CSRF token
    pub enforce_csrf: bool,

    /// Allow permissive CORS (default: false = same origin only)
    pub cors_permissive: bool,

    pub request_timeout: Duration,

    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: "sqlite://yatube.db".to_string(),
            media_root: PathBuf::from("media"),
            posts_per_page: DEFAULT_PER_PAGE,
            index_cache_ttl: Duration::from_secs(DEFAULT_INDEX_CACHE_SECONDS),
            enforce_csrf: true,
            cors_permissive: false,
            request_timeout: Duration::from_secs(30),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Optional overrides, as read from a config file or the environment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub media_root: Option<PathBuf>,
    pub posts_per_page: Option<u32>,
    pub index_cache_seconds: Option<u64>,
    pub enforce_csrf: Option<bool>,
    pub cors_permissive: Option<bool>,
    pub request_timeout_seconds: Option<u64>,
}

impl ConfigOverrides {
    /// Read overrides from environment variables.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_env() -> Self {
        Self {
            bind: env_parse("YATUBE_BIND"),
            database_url: std::env::var("DATABASE_URL").ok(),
            media_root: std::env::var("YATUBE_MEDIA_ROOT").ok().map(PathBuf::from),
            posts_per_page: env_parse("YATUBE_POSTS_PER_PAGE"),
            index_cache_seconds: env_parse("YATUBE_INDEX_CACHE_SECONDS"),
            enforce_csrf: None,
            cors_permissive: None,
            request_timeout_seconds: None,
        }
    }

    /// Layer `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: ConfigOverrides) -> Self {
        Self {
            bind: other.bind.or(self.bind),
            database_url: other.database_url.or(self.database_url),
            media_root: other.media_root.or(self.media_root),
            posts_per_page: other.posts_per_page.or(self.posts_per_page),
            index_cache_seconds: other.index_cache_seconds.or(self.index_cache_seconds),
            enforce_csrf: other.enforce_csrf.or(self.enforce_csrf),
            cors_permissive: other.cors_permissive.or(self.cors_permissive),
            request_timeout_seconds: other.request_timeout_seconds.or(self.request_timeout_seconds),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment value");
            None
        }
    }
}

impl ServerConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(ConfigOverrides::from_env())
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(bind) = overrides.bind {
            self.bind_addr = bind;
        }
        if let Some(url) = overrides.database_url {
            self.database_url = url;
        }
        if let Some(root) = overrides.media_root {
            self.media_root = root;
        }
        if let Some(per_page) = overrides.posts_per_page {
            self.posts_per_page = per_page.max(1);
        }
        if let Some(secs) = overrides.index_cache_seconds {
            self.index_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(enforce) = overrides.enforce_csrf {
            self.enforce_csrf = enforce;
        }
        if let Some(permissive) = overrides.cors_permissive {
            self.cors_permissive = permissive;
        }
        if let Some(secs) = overrides.request_timeout_seconds {
            self.request_timeout = Duration::from_secs(secs);
        }
        self
    }
}
