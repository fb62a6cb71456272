//! Command implementations for the yatube CLI

pub mod group;
pub mod serve;
pub mod user;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use yatube_server::db::create_pool;
use yatube_server::ConfigOverrides;

use crate::config;

pub use group::run_group;
pub use serve::run_serve;
pub use user::run_user;

/// Database selection shared by the admin commands
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Open the configured database, creating the schema if needed.
pub async fn open_pool(
    config_file: Option<&Path>,
    db: DatabaseArgs,
) -> Result<yatube_server::db::SqlitePool> {
    let config = config::resolve(
        config_file,
        ConfigOverrides {
            database_url: db.database_url,
            ..Default::default()
        },
    )?;

    create_pool(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))
}
