//! User repository
//!
//! Accounts are referenced by posts, comments, follows and sessions;
//! deleting a user cascades to all of them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::DbError;
use crate::models::Username;

/// Password hash marking an account that cannot log in
pub const UNUSABLE_PASSWORD: &str = "!";

/// User record from database (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

/// Input for account creation
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// PHC string, or [`UNUSABLE_PASSWORD`]
    pub password_hash: String,
}

impl NewUser {
    /// A user without a usable password.
    pub fn without_password(username: Username) -> Self {
        Self {
            username,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: UNUSABLE_PASSWORD.to_owned(),
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, date_joined";

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user; a taken username is a `Conflict`.
    pub async fn create(&self, user: NewUser) -> Result<User, DbError> {
        let sql = format!(
            "INSERT INTO auth_user (username, email, first_name, last_name, password_hash, date_joined) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as(&sql)
            .bind(user.username.as_str())
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password_hash)
            .bind(Utc::now())
            .fetch_one(self.pool)
            .await
            .map_err(|e| DbError::from_insert(e, "user", user.username.as_str()))
    }

    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth_user WHERE id = ?");
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth_user WHERE username = ?");
        sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", username))
    }

    /// Fetch a user together with the stored password hash (login only).
    pub async fn credentials(&self, username: &str) -> Result<Option<(User, String)>, DbError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM auth_user WHERE username = ?");

        #[derive(FromRow)]
        struct Row {
            #[sqlx(flatten)]
            user: User,
            password_hash: String,
        }

        let row: Option<Row> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Delete a user and, through cascades, everything they authored.
    pub async fn delete_by_username(&self, username: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM auth_user WHERE username = ?")
            .bind(username)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", username));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    fn new_user(name: &str) -> NewUser {
        NewUser::without_password(Username::new(name).unwrap())
    }

    #[tokio::test]
    async fn create_and_fetch() {
        let pool = create_memory_pool().await.unwrap();
        let repo = UserRepo::new(&pool);

        let created = repo.create(new_user("auth")).await.unwrap();
        let fetched = repo.get_by_username("auth").await.unwrap();
        assert_eq!(created, fetched);
        assert_eq!(repo.get(created.id).await.unwrap().username, "auth");
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let pool = create_memory_pool().await.unwrap();
        let repo = UserRepo::new(&pool);

        repo.create(new_user("auth")).await.unwrap();
        let err = repo.create(new_user("auth")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { resource: "user", .. }));
    }

    #[tokio::test]
    async fn credentials_carry_hash() {
        let pool = create_memory_pool().await.unwrap();
        let repo = UserRepo::new(&pool);
        repo.create(new_user("auth")).await.unwrap();

        let (user, hash) = repo.credentials("auth").await.unwrap().unwrap();
        assert_eq!(user.username, "auth");
        assert_eq!(hash, UNUSABLE_PASSWORD);
        assert!(repo.credentials("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let pool = create_memory_pool().await.unwrap();
        let err = UserRepo::new(&pool).delete_by_username("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "user", .. }));
    }
}
