//! In-process, session scoped storage backend
use super::error::{StorageError, StorageOperation};
use super::product::Product;
use super::storage::{DIGEST_KEY, SNAPSHOT_KEY, Snapshot, Storage};
use super::utils;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Keeps encoded snapshots in memory for the lifetime of the process.
///
/// Clones share the same session data, so a clone handed to a listener
/// observes everything the cart persisted.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    session_id: String,
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl SessionStorage {
    /// Opens a fresh, empty session under a newly generated id.
    pub fn new() -> Result<Self, StorageError> {
        let session_id = utils::new_session_id().map_err(|err| {
            StorageError::new("Failed to generate a session id.").with_source(err)
        })?;

        Ok(Self::with_session_id(session_id))
    }

    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Raw bytes stored under `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock(StorageOperation::Load)?.get(key).cloned())
    }

    /// Stores raw bytes under an ancillary key.
    pub fn put(&self, key: impl Into<String>, value: Vec<u8>) -> Result<(), StorageError> {
        self.lock(StorageOperation::Save)?.insert(key.into(), value);
        Ok(())
    }

    fn lock(
        &self,
        operation: StorageOperation,
    ) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>, StorageError> {
        self.entries.lock().map_err(|_| {
            StorageError::new(format!("Session {} is poisoned.", self.session_id))
                .with_operation(operation)
        })
    }
}

impl Storage for SessionStorage {
    fn save(&self, products: &[Product]) -> Result<(), StorageError> {
        let (digest, blob) = Snapshot::new(products).encode()?;
        tracing::debug!(session = %self.session_id, count = products.len(), bytes = blob.len(), "Saving cart snapshot");

        let mut entries = self.lock(StorageOperation::Save)?;
        entries.insert(SNAPSHOT_KEY.to_string(), blob);
        entries.insert(DIGEST_KEY.to_string(), digest.into_bytes());

        Ok(())
    }

    fn load(&self) -> Result<Vec<Product>, StorageError> {
        let entries = self.lock(StorageOperation::Load)?;
        let Some(blob) = entries.get(SNAPSHOT_KEY) else {
            tracing::debug!(session = %self.session_id, "No cart snapshot in session");
            return Ok(Vec::new());
        };

        let snapshot = Snapshot::decode(blob, entries.get(DIGEST_KEY).map(Vec::as_slice))?;
        tracing::debug!(
            session = %self.session_id,
            count = snapshot.products.len(),
            saved_at = %snapshot.saved_at.to_datetime_utc(),
            "Loaded cart snapshot"
        );

        Ok(snapshot.products)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.lock(StorageOperation::Clear)?;
        entries.remove(SNAPSHOT_KEY);
        entries.remove(DIGEST_KEY);
        tracing::debug!(session = %self.session_id, "Cleared cart snapshot");

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.lock(StorageOperation::Delete)?.remove(key);
        tracing::debug!(session = %self.session_id, key = %key, "Deleted session key");

        Ok(())
    }
}
