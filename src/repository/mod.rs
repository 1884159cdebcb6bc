//! Storage collaborators.
//!
//! The authentication core and the HTTP handlers only talk to storage through
//! [`UserStore`] and [`TaskStore`]. Postgres implementations back the running
//! service; the in-memory ones back tests and local experiments.
//!
//! Uniqueness of `username` and `email` is enforced by the store itself, so a
//! duplicate slipping past a service-level pre-check still surfaces as
//! [`StoreError::Duplicate`].

pub mod memory;
pub mod tasks;
pub mod users;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::errors::DuplicateField;
use crate::models::{NewUserRecord, Task, TaskInput, TaskQuery, UserRecord, UserUpdate};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use tasks::PgTaskStore;
pub use users::PgUserStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("{0} already exists")]
    Duplicate(DuplicateField),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Maps unique violations on `users_username_key` / `users_email_key` to
/// [`StoreError::Duplicate`] and `RowNotFound` to [`StoreError::NotFound`].
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = error {
            return StoreError::NotFound;
        }
        if let Some(db_err) = error.as_database_error() {
            if db_err.is_unique_violation() {
                match db_err.constraint() {
                    Some("users_username_key") => {
                        return StoreError::Duplicate(DuplicateField::Username)
                    }
                    Some("users_email_key") => return StoreError::Duplicate(DuplicateField::Email),
                    _ => {}
                }
            }
        }
        StoreError::Database(error)
    }
}

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Inserts a new account. Fails with `Duplicate` on a username or email collision.
    async fn create(&self, user: NewUserRecord) -> Result<UserRecord, StoreError>;

    /// Applies the present fields of `changes`. `NotFound` when `id` does not exist.
    async fn update(&self, id: i32, changes: &UserUpdate) -> Result<UserRecord, StoreError>;

    async fn delete(&self, id: i32) -> Result<(), StoreError>;

    /// Accounts ordered by id.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, StoreError>;
}

/// Owner-scoped task persistence. Another user's task behaves as missing.
#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    /// Newest first.
    async fn list(&self, owner_id: i32, query: &TaskQuery) -> Result<Vec<Task>, StoreError>;

    async fn get(&self, owner_id: i32, id: Uuid) -> Result<Option<Task>, StoreError>;

    async fn create(&self, task: Task) -> Result<Task, StoreError>;

    async fn update(
        &self,
        owner_id: i32,
        id: Uuid,
        input: &TaskInput,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns whether a task was removed.
    async fn delete(&self, owner_id: i32, id: Uuid) -> Result<bool, StoreError>;
}
