//! Password hashing and credential checks
//!
//! Hashes are Argon2id PHC strings. Hashing is CPU-bound, so both hashing
//! and verification run on the blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sqlx::SqlitePool;

use crate::db::repos::users::UNUSABLE_PASSWORD;
use crate::db::{DbError, User, UserRepo};
use crate::models::NewPassword;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Db(#[from] DbError),
}

fn hash_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_blocking(password: &str, stored: &str) -> Result<bool, AuthError> {
    if stored == UNUSABLE_PASSWORD {
        return Ok(false);
    }

    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}

/// Hash a validated password.
pub async fn hash_password(password: &NewPassword) -> Result<String, AuthError> {
    let password = password.expose().to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&password)).await?
}

/// Check a stored hash against a candidate password.
pub async fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let stored = stored.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&password, &stored)).await?
}

/// The user matching `username` and `password`, if any.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<User>, AuthError> {
    let Some((user, stored)) = UserRepo::new(pool).credentials(username).await? else {
        return Ok(None);
    };

    if verify_password(password, &stored).await? {
        Ok(Some(user))
    } else {
        tracing::debug!(username, "password mismatch");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, NewUser};
    use crate::models::Username;

    #[tokio::test]
    async fn hash_then_verify() {
        let password = NewPassword::new("correct horse", "correct horse").unwrap();
        let hash = hash_password(&password).await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).await.unwrap());
        assert!(!verify_password("wrong horse", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn unusable_password_never_matches() {
        assert!(!verify_password("", UNUSABLE_PASSWORD).await.unwrap());
    }

    #[tokio::test]
    async fn authenticate_by_username() {
        let pool = create_memory_pool().await.unwrap();
        let password = NewPassword::new("s3cret-pass", "s3cret-pass").unwrap();
        let mut new_user = NewUser::without_password(Username::new("leo").unwrap());
        new_user.password_hash = hash_password(&password).await.unwrap();
        UserRepo::new(&pool).create(new_user).await.unwrap();

        let user = authenticate(&pool, "leo", "s3cret-pass").await.unwrap();
        assert_eq!(user.map(|u| u.username).as_deref(), Some("leo"));

        assert!(authenticate(&pool, "leo", "nope").await.unwrap().is_none());
        assert!(authenticate(&pool, "nobody", "s3cret-pass")
            .await
            .unwrap()
            .is_none());
    }
}
