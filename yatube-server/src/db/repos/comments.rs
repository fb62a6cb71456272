//! Comment repository

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::DbError;
use crate::models::{preview, CommentText};

/// Comment record joined with its author
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(preview(&self.text))
    }
}

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created
    FROM posts_comment c
    JOIN auth_user u ON u.id = c.author_id
"#;

/// Comment repository
pub struct CommentRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a comment; an unknown post is `NotFound`.
    pub async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        text: CommentText,
    ) -> Result<Comment, DbError> {
        let mut tx = self.pool.begin().await?;

        let post_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts_post WHERE id = ?)")
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await?;

        if !post_exists {
            return Err(DbError::not_found("post", post_id));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts_comment (post_id, author_id, text, created)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let comment = sqlx::query_as(&format!("{COMMENT_SELECT} WHERE c.id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(comment)
    }

    /// Comments on a post, oldest first.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DbError> {
        let comments = sqlx::query_as(&format!(
            "{COMMENT_SELECT} WHERE c.post_id = ? ORDER BY c.created ASC, c.id ASC"
        ))
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        Ok(comments)
    }
}
