//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Relies on constraints and ON CONFLICT instead of check-then-insert
//! - Borrows the pool; repos are cheap to construct per request

pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod sessions;
pub mod users;

pub use comments::{Comment, CommentRepo};
pub use follows::FollowRepo;
pub use groups::{Group, GroupRepo};
pub use posts::{NewPost, Post, PostFilter, PostRepo};
pub use sessions::{SessionRepo, SESSION_TTL_DAYS};
pub use users::{NewUser, User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} '{id}' already exists")]
    Conflict { resource: &'static str, id: String },
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        Self::Sqlx(e)
    }
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Map a unique-constraint violation to `Conflict`, anything else to `Sqlx`.
    pub(crate) fn from_insert(e: sqlx::Error, resource: &'static str, id: &str) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict {
                resource,
                id: id.to_owned(),
            },
            _ => Self::Sqlx(e),
        }
    }
}
