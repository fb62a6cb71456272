//! yatube CLI - run and administer a yatube blog
//!
//! This is the main entry point for the `yatube` command-line tool:
//! - HTTP server (`serve` subcommand)
//! - Group management (`group` subcommand)
//! - User removal (`user` subcommand)
//! - Configuration inspection (`config` subcommand)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "yatube",
    author,
    version,
    about = "Blog server where users post, join groups, comment and follow authors",
    long_about = "Run the yatube HTTP server and manage its data: create and delete groups, \
                  remove users, and inspect the effective configuration."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.yatube/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Create, list and delete groups
    Group(commands::group::GroupArgs),
    /// Manage user accounts
    User(commands::user::UserArgs),
    /// Inspect configuration (path, show)
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    let config_file = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config_file).await?,
        Commands::Group(args) => commands::run_group(args, config_file).await?,
        Commands::User(args) => commands::run_user(args, config_file).await?,
        Commands::Config(args) => config::run_config(args, config_file)?,
    }

    Ok(())
}
