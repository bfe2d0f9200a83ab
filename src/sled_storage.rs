//! File backed storage on top of sled
use super::error::{StorageError, StorageOperation};
use super::product::Product;
use super::storage::{DIGEST_KEY, SNAPSHOT_KEY, Snapshot, Storage};
use sled::{Batch, Db, Tree};
use std::sync::Arc;

/// One sled tree per session, holding the snapshot blob and its digest.
pub struct SledStorage {
    instance: Arc<Db>,
    tree: Tree,
    session_id: String,
}

impl SledStorage {
    pub fn open(instance: Arc<Db>, session_id: impl Into<String>) -> Result<Self, StorageError> {
        let session_id = session_id.into();
        let tree = instance.open_tree(session_id.as_bytes()).map_err(|err| {
            StorageError::new(format!("Failed to open sled tree for session {session_id}."))
                .with_operation(StorageOperation::Load)
                .with_source(err)
        })?;

        Ok(Self {
            instance,
            tree,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Blocks until every pending write has reached disk.
    pub fn flush(&self) -> Result<usize, StorageError> {
        self.instance.flush().map_err(|err| {
            StorageError::new("Failed to flush sled database.")
                .with_operation(StorageOperation::Save)
                .with_source(err)
        })
    }
}

fn backend_error(operation: StorageOperation, err: sled::Error) -> StorageError {
    let message = match operation {
        StorageOperation::Save => "An error occurred while saving data to sled storage.",
        StorageOperation::Load => "An error occurred while loading data from sled storage.",
        StorageOperation::Clear => "An error occurred while clearing sled storage.",
        StorageOperation::Delete => "An error occurred while deleting data from sled storage.",
    };
    StorageError::new(message)
        .with_operation(operation)
        .with_source(err)
}

impl Storage for SledStorage {
    fn save(&self, products: &[Product]) -> Result<(), StorageError> {
        let (digest, blob) = Snapshot::new(products).encode()?;
        tracing::debug!(session = %self.session_id, count = products.len(), bytes = blob.len(), "Saving cart snapshot");

        // blob and digest land together or not at all
        let mut batch = Batch::default();
        batch.insert(SNAPSHOT_KEY.as_bytes(), blob);
        batch.insert(DIGEST_KEY.as_bytes(), digest.as_bytes());
        self.tree
            .apply_batch(batch)
            .map_err(|err| backend_error(StorageOperation::Save, err))
    }

    fn load(&self) -> Result<Vec<Product>, StorageError> {
        let load = |key: &str| {
            self.tree
                .get(key)
                .map_err(|err| backend_error(StorageOperation::Load, err))
        };

        let Some(blob) = load(SNAPSHOT_KEY)? else {
            tracing::debug!(session = %self.session_id, "No cart snapshot in sled tree");
            return Ok(Vec::new());
        };
        let digest = load(DIGEST_KEY)?;

        let snapshot = Snapshot::decode(&blob, digest.as_deref())?;
        tracing::debug!(
            session = %self.session_id,
            count = snapshot.products.len(),
            saved_at = %snapshot.saved_at.to_datetime_utc(),
            "Loaded cart snapshot"
        );

        Ok(snapshot.products)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut batch = Batch::default();
        batch.remove(SNAPSHOT_KEY.as_bytes());
        batch.remove(DIGEST_KEY.as_bytes());
        self.tree
            .apply_batch(batch)
            .map_err(|err| backend_error(StorageOperation::Clear, err))?;
        tracing::debug!(session = %self.session_id, "Cleared cart snapshot");

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.tree
            .remove(key)
            .map_err(|err| backend_error(StorageOperation::Delete, err))?;
        tracing::debug!(session = %self.session_id, key = %key, "Deleted sled key");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductCategory;
    use tempfile::tempdir;

    fn laptop() -> Product {
        Product::with_initial_quantity("001", "Laptop", 1500.0, ProductCategory::Electronics, 2)
            .unwrap()
    }

    #[test]
    fn persists_and_clears() -> anyhow::Result<()> {
        let temp_dir = tempdir()?;
        let db = Arc::new(sled::open(temp_dir.path().join("unit.db"))?);
        let storage = SledStorage::open(db, "session_unit")?;

        assert!(storage.load()?.is_empty());

        storage.save(&[laptop()])?;
        assert_eq!(storage.load()?, vec![laptop()]);

        storage.clear()?;
        assert!(storage.load()?.is_empty());

        Ok(())
    }

    #[test]
    fn sessions_use_separate_trees() -> anyhow::Result<()> {
        let temp_dir = tempdir()?;
        let db = Arc::new(sled::open(temp_dir.path().join("trees.db"))?);
        let first = SledStorage::open(db.clone(), "session_a")?;
        let second = SledStorage::open(db, "session_b")?;

        first.save(&[laptop()])?;

        assert!(second.load()?.is_empty());
        assert_eq!(first.session_id(), "session_a");

        Ok(())
    }
}
