//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use stride_core::model::{TaskId, UserId};

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("task {task} not found for user {user}")]
    TaskNotFound { user: UserId, task: TaskId },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
