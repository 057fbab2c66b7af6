use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use stride_core::model::{ProgressRecord, Task, UserId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Repository contract for per-user progress records.
///
/// `get_or_create` is the single lazy-initialization point: every tracker
/// operation starts by calling it, so no caller ever needs its own
/// "create the record if missing" check.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch a user's record, creating the default record on first access.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be reached.
    async fn get_or_create(&self, user: &UserId) -> Result<ProgressRecord, StorageError>;

    /// Persist or update a record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn put_record(&self, record: &ProgressRecord) -> Result<(), StorageError>;
}

/// Repository contract for a user's current-day task set.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Replace a user's task set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the set cannot be stored.
    async fn put_tasks(&self, user: &UserId, tasks: Vec<Task>) -> Result<(), StorageError>;

    /// Fetch a user's task set, empty when none has been assigned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be reached.
    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, StorageError>;

    /// Persist or update a single task within a user's set, appending it
    /// when no task with that id exists yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the task cannot be stored.
    async fn upsert_task(&self, user: &UserId, task: &Task) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation.
///
/// This is the production store for this crate, not just a test double:
/// all progress state is process-memory for the process lifetime, by
/// design. Durability, if ever wanted, is a separate backend behind the
/// same traits.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<UserId, ProgressRecord>>>,
    tasks: Arc<Mutex<HashMap<UserId, Vec<Task>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_or_create(&self, user: &UserId) -> Result<ProgressRecord, StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard
            .entry(user.clone())
            .or_insert_with(|| ProgressRecord::new(user.clone()));
        Ok(record.clone())
    }

    async fn put_record(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.user_id.clone(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn put_tasks(&self, user: &UserId, tasks: Vec<Task>) -> Result<(), StorageError> {
        let mut guard = self
            .tasks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user.clone(), tasks);
        Ok(())
    }

    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, StorageError> {
        let guard = self
            .tasks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn upsert_task(&self, user: &UserId, task: &Task) -> Result<(), StorageError> {
        let mut guard = self
            .tasks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let tasks = guard.entry(user.clone()).or_default();
        match tasks.iter_mut().find(|t| t.id() == task.id()) {
            Some(existing) => *existing = task.clone(),
            None => tasks.push(task.clone()),
        }
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub tasks: Arc<dyn TaskRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let tasks: Arc<dyn TaskRepository> = Arc::new(repo);
        Self { progress, tasks }
    }
}
