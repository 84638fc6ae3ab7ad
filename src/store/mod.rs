//! Persistence seams for users and tasks.
//!
//! Services only talk to the `UserStore` and `TaskStore` traits. `postgres` backs them with
//! sqlx; `memory` keeps everything in process and is what the test suites run against.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;

use crate::models::{NewTask, NewUser, Task, TaskFilter, User};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

/// A failure reported by a store implementation.
#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "database error: {}", e),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            StoreError::Unavailable(_) => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Database(error)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persists user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Inserts the user and returns the id assigned to it.
    async fn insert(&self, user: &NewUser) -> StoreResult<i64>;
}

/// Persists task records. Listings are ordered by `created_at` descending.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Unscoped listing across all owners.
    async fn fetch_page(&self, limit: i64, offset: i64) -> StoreResult<Vec<Task>>;

    async fn fetch_by_id(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Owner-scoped listing narrowed by every present predicate in `filter`.
    async fn fetch_filtered(
        &self,
        owner: i64,
        limit: i64,
        offset: i64,
        filter: &TaskFilter,
    ) -> StoreResult<Vec<Task>>;

    async fn list_distinct_categories(&self) -> StoreResult<Vec<String>>;

    /// Inserts the task and returns the id assigned to it.
    async fn insert(&self, task: &NewTask) -> StoreResult<i64>;

    /// Replaces the mutable fields of the row matching both `task.id` and `task.user_id`.
    /// Returns the number of affected rows.
    async fn update(&self, task: &Task) -> StoreResult<u64>;

    /// Deletes the row matching both `id` and `owner`. Returns the number of affected rows.
    async fn delete(&self, id: i64, owner: i64) -> StoreResult<u64>;
}
