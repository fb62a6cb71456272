//! Session repository - opaque cookie keys mapped to users

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{DbError, User};

/// Lifetime of a login session
pub const SESSION_TTL_DAYS: i64 = 14;

/// Session repository
pub struct SessionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a session for `user_id`, returning the new session key.
    pub async fn create(&self, user_id: i64) -> Result<String, DbError> {
        let key = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        sqlx::query("INSERT INTO auth_session (session_key, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&key)
            .bind(user_id)
            .bind(expires_at)
            .execute(self.pool)
            .await?;

        Ok(key)
    }

    /// Resolve a session key to its user; expired or unknown keys yield `None`.
    pub async fn user_for(&self, key: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.date_joined
            FROM auth_session s
            JOIN auth_user u ON u.id = s.user_id
            WHERE s.session_key = ? AND s.expires_at > ?
            "#,
        )
        .bind(key)
        .bind(Utc::now())
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// End a session. Unknown keys are ignored.
    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM auth_session WHERE session_key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Drop expired sessions, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM auth_session WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, NewUser, UserRepo};
    use crate::models::Username;

    #[tokio::test]
    async fn session_round_trip() {
        let pool = create_memory_pool().await.unwrap();
        let user = UserRepo::new(&pool)
            .create(NewUser::without_password(Username::new("user").unwrap()))
            .await
            .unwrap();

        let repo = SessionRepo::new(&pool);
        let key = repo.create(user.id).await.unwrap();
        assert_eq!(repo.user_for(&key).await.unwrap(), Some(user));

        repo.delete(&key).await.unwrap();
        assert_eq!(repo.user_for(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_session_is_ignored() {
        let pool = create_memory_pool().await.unwrap();
        let user = UserRepo::new(&pool)
            .create(NewUser::without_password(Username::new("user").unwrap()))
            .await
            .unwrap();

        sqlx::query("INSERT INTO auth_session (session_key, user_id, expires_at) VALUES ('old', ?, ?)")
            .bind(user.id)
            .bind(Utc::now() - Duration::minutes(1))
            .execute(&pool)
            .await
            .unwrap();

        let repo = SessionRepo::new(&pool);
        assert_eq!(repo.user_for("old").await.unwrap(), None);
        assert_eq!(repo.purge_expired().await.unwrap(), 1);
    }
}
