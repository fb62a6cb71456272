//! Layered configuration for the CLI
//!
//! Precedence, highest first: command-line flags, environment variables,
//! the TOML config file, built-in defaults. The file lives at
//! `~/.yatube/config.toml` unless `--config` names another one.
//!
//! ```toml
//! bind = "0.0.0.0:8000"
//! database_url = "sqlite:///var/lib/yatube/yatube.db"
//! media_root = "/var/lib/yatube/media"
//! posts_per_page = 10
//! index_cache_seconds = 20
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use yatube_server::{ConfigOverrides, ServerConfig};

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".yatube").join("config.toml"))
}

/// Read overrides from a config file.
///
/// A missing file at the default location is not an error; a missing file
/// that was asked for explicitly is.
pub fn load_file(explicit: Option<&Path>) -> Result<ConfigOverrides> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ConfigOverrides::default()),
        },
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let overrides = toml::from_str(&raw)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(overrides)
}

/// Resolve the effective server configuration.
pub fn resolve(config_file: Option<&Path>, flags: ConfigOverrides) -> Result<ServerConfig> {
    let layered = load_file(config_file)?
        .merge(ConfigOverrides::from_env())
        .merge(flags);
    Ok(ServerConfig::default().with_overrides(layered))
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Print the effective configuration
    Show,
}

pub fn run_config(args: ConfigArgs, config_file: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            let path = config_file
                .map(Path::to_path_buf)
                .or_else(default_config_path)
                .context("Could not determine home directory")?;
            println!("{}", path.display());
        }
        ConfigCommands::Show => {
            let config = resolve(config_file, ConfigOverrides::default())?;
            println!("bind = \"{}\"", config.bind_addr);
            println!("database_url = \"{}\"", config.database_url);
            println!("media_root = \"{}\"", config.media_root.display());
            println!("posts_per_page = {}", config.posts_per_page);
            println!("index_cache_seconds = {}", config.index_cache_ttl.as_secs());
            println!("enforce_csrf = {}", config.enforce_csrf);
            println!("cors_permissive = {}", config.cors_permissive);
            println!("request_timeout_seconds = {}", config.request_timeout.as_secs());
        }
    }
    Ok(())
}
