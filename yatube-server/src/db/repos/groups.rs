//! Group repository
//!
//! Groups are created out-of-band (admin CLI). Deleting a group keeps its
//! posts and clears their group reference.

use std::fmt;

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::DbError;
use crate::models::{GroupSlug, GroupTitle};

/// Group record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Group repository
pub struct GroupRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> GroupRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a group; a taken slug is a `Conflict`.
    pub async fn create(
        &self,
        slug: GroupSlug,
        title: GroupTitle,
        description: &str,
    ) -> Result<Group, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO posts_group (title, slug, description)
            VALUES (?, ?, ?)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(title.as_str())
        .bind(slug.as_str())
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, "group", slug.as_str()))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Group, DbError> {
        sqlx::query_as("SELECT id, title, slug, description FROM posts_group WHERE slug = ?")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("group", slug))
    }

    /// Look up a group by id; `None` when it does not exist.
    pub async fn find(&self, id: i64) -> Result<Option<Group>, DbError> {
        let group = sqlx::query_as("SELECT id, title, slug, description FROM posts_group WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(group)
    }

    /// All groups in creation order (form choices, admin listing).
    pub async fn list(&self) -> Result<Vec<Group>, DbError> {
        let groups = sqlx::query_as("SELECT id, title, slug, description FROM posts_group ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(groups)
    }

    pub async fn delete_by_slug(&self, slug: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM posts_group WHERE slug = ?")
            .bind(slug)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("group", slug));
        }
        Ok(())
    }
}
