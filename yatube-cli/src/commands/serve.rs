//! HTTP server command
//!
//! Runs the yatube server until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use yatube_server::db::create_pool;
use yatube_server::{run_server, ConfigOverrides};

use crate::config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory for uploaded images
    #[arg(long)]
    pub media_root: Option<PathBuf>,

    /// Posts per page on list pages
    #[arg(long)]
    pub posts_per_page: Option<u32>,

    /// Lifetime of the cached index page in seconds (0 disables it)
    #[arg(long)]
    pub index_cache_seconds: Option<u64>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

impl ServeArgs {
    fn overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            bind: self.bind,
            database_url: self.database_url,
            media_root: self.media_root,
            posts_per_page: self.posts_per_page,
            index_cache_seconds: self.index_cache_seconds,
            cors_permissive: self.cors_permissive.then_some(true),
            ..Default::default()
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_file: Option<&Path>) -> Result<()> {
    let config = config::resolve(config_file, args.overrides())?;
    tracing::info!("Starting yatube server on {}", config.bind_addr);

    let pool = create_pool(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    // Blocks until shutdown
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
