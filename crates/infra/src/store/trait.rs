use std::sync::Arc;

use thiserror::Error;

use user_service_core::{DomainError, NewUser, User, UserFilter, UserId, UserPatch};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// `NotFound` and `Validation` are request-level outcomes; `Database` covers
/// everything the backend itself failed at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => StoreError::NotFound,
            DomainError::Validation(msg) => StoreError::Validation(msg),
            DomainError::InvalidId(msg) => StoreError::Validation(msg),
        }
    }
}

/// Persistence for the single `users` table.
///
/// ## Soft deletes
///
/// `delete()` only stamps `deleted_at`. Every read (`list`, `get`) and every
/// write (`update`, `delete`) treats a stamped row as missing.
///
/// ## Updates
///
/// `update()` loads the row, merges the patch with `User::apply`, validates
/// the merged record, and persists it in one step. Nothing is written when
/// the merged record is invalid.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Create the backing table if it does not exist. Idempotent.
    async fn migrate(&self) -> StoreResult<()>;

    /// Live rows matching `filter`, ordered by id.
    async fn list(&self, filter: &UserFilter) -> StoreResult<Vec<User>>;

    async fn get(&self, id: UserId) -> StoreResult<User>;

    /// Insert a row; the store assigns the id and timestamps.
    async fn create(&self, new: NewUser) -> StoreResult<User>;

    async fn update(&self, id: UserId, patch: &UserPatch) -> StoreResult<User>;

    /// Soft-delete a live row.
    async fn delete(&self, id: UserId) -> StoreResult<()>;
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn migrate(&self) -> StoreResult<()> {
        (**self).migrate().await
    }

    async fn list(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        (**self).list(filter).await
    }

    async fn get(&self, id: UserId) -> StoreResult<User> {
        (**self).get(id).await
    }

    async fn create(&self, new: NewUser) -> StoreResult<User> {
        (**self).create(new).await
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> StoreResult<User> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: UserId) -> StoreResult<()> {
        (**self).delete(id).await
    }
}
