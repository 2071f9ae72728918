//! Mount export persistence

use crate::error::StorageError;
use crate::store::{KeyValueStore, FILE_TREE_KEY};
use crate::tree::mount::MountTree;
use tracing::{debug, warn};

/// Saves and loads the serialized mount export
pub struct SnapshotStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Replace the stored export
    pub fn save_mount(&self, mount: &MountTree) -> Result<(), StorageError> {
        let text = serde_json::to_string(mount)?;
        self.store.remove(FILE_TREE_KEY)?;
        self.store.set(FILE_TREE_KEY, &text)?;
        debug!(entries = mount.len(), bytes = text.len(), "Saved mount snapshot");
        Ok(())
    }

    /// Load the stored export. An unparsable value is reported as an error.
    pub fn load_mount(&self) -> Result<Option<MountTree>, StorageError> {
        match self.store.get(FILE_TREE_KEY)? {
            Some(text) => match serde_json::from_str(&text) {
                Ok(mount) => Ok(Some(mount)),
                Err(e) => {
                    warn!(error = %e, "Stored mount snapshot is not valid");
                    Err(StorageError::Serialization(e))
                }
            },
            None => Ok(None),
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(FILE_TREE_KEY)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
