//! Group administration
//!
//! Groups are not created through the web site; this is how they appear.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use yatube_server::db::GroupRepo;
use yatube_server::models::{GroupSlug, GroupTitle};

use super::{open_pool, DatabaseArgs};

#[derive(Args, Debug)]
pub struct GroupArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    #[command(subcommand)]
    pub command: GroupCommands,
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Create a group
    Create {
        /// URL slug (letters, digits, hyphens, underscores)
        #[arg(long)]
        slug: String,

        /// Display title
        #[arg(long)]
        title: String,

        /// Longer description shown on the group page
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List all groups
    List,
    /// Delete a group; its posts stay, without a group
    Delete {
        /// Slug of the group to delete
        slug: String,
    },
}

pub async fn run_group(args: GroupArgs, config_file: Option<&Path>) -> Result<()> {
    let pool = open_pool(config_file, args.db).await?;
    let groups = GroupRepo::new(&pool);

    match args.command {
        GroupCommands::Create {
            slug,
            title,
            description,
        } => {
            let slug = GroupSlug::new(&slug).context("Invalid slug")?;
            let title = GroupTitle::new(&title).context("Invalid title")?;
            let group = groups
                .create(slug, title, &description)
                .await
                .context("Failed to create group")?;
            println!("Created group {} ({})", group.slug, group.title);
        }
        GroupCommands::List => {
            for group in groups.list().await.context("Failed to list groups")? {
                println!("{}\t{}", group.slug, group.title);
            }
        }
        GroupCommands::Delete { slug } => {
            groups
                .delete_by_slug(&slug)
                .await
                .with_context(|| format!("Failed to delete group {slug}"))?;
            println!("Deleted group {slug}");
        }
    }

    Ok(())
}
