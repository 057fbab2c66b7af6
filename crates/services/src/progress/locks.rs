use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

use storage::repository::StorageError;
use stride_core::model::UserId;

/// Per-user lock table serializing mutations on the same progress record.
///
/// Two concurrent toggles on one user's record would otherwise interleave
/// their read-modify-write cycles and corrupt counters; operations on
/// different users share nothing and proceed in parallel. Guards are held
/// across awaits, hence the async mutex per user.
pub(crate) struct UserLocks {
    inner: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// The lock guarding a user's record, created on first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the registry mutex is poisoned.
    pub(crate) fn lock_for(&self, user: &UserId) -> Result<Arc<AsyncMutex<()>>, StorageError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Arc::clone(guard.entry(user.clone()).or_default()))
    }
}
