//! Database layer - connection pool and repositories
//!
//! # Design Principles
//!
//! - Connection pool, never a shared `Mutex<Connection>`
//! - All list operations use JOINs - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Ordering is part of every list query, newest first with id as tiebreaker

pub mod pool;
pub mod repos;

pub use pool::{create_memory_pool, create_pool, create_pool_with_options, migrate};
pub use sqlx::SqlitePool;
pub use repos::*;
