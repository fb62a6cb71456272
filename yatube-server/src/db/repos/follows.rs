//! Follow repository
//!
//! Both operations are idempotent: following twice keeps one row,
//! unfollowing a non-followed author changes nothing.

use sqlx::SqlitePool;

use super::DbError;

/// Follow repository
pub struct FollowRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FollowRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Subscribe `user_id` to `author_id`. Returns whether a row was added.
    ///
    /// Self-follow is a no-op.
    pub async fn follow(&self, user_id: i64, author_id: i64) -> Result<bool, DbError> {
        if user_id == author_id {
            return Ok(false);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO posts_follow (user_id, author_id)
            VALUES (?, ?)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove the subscription. Returns whether a row was deleted.
    pub async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM posts_follow WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool, DbError> {
        let exists = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM posts_follow WHERE user_id = ? AND author_id = ?)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}
