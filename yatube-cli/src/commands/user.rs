//! User administration

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use yatube_server::db::UserRepo;

use super::{open_pool, DatabaseArgs};

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Delete a user with all their posts, comments and subscriptions
    Delete {
        /// Username to delete
        username: String,
    },
}

pub async fn run_user(args: UserArgs, config_file: Option<&Path>) -> Result<()> {
    let pool = open_pool(config_file, args.db).await?;

    match args.command {
        UserCommands::Delete { username } => {
            UserRepo::new(&pool)
                .delete_by_username(&username)
                .await
                .with_context(|| format!("Failed to delete user {username}"))?;
            println!("Deleted user {username}");
        }
    }

    Ok(())
}
