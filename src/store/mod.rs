//! Persistence Medium
//!
//! Opaque key-value storage for serialized session state: the mount export and the
//! terminal command history. Values are JSON text.

pub mod history;
pub mod persistence;
pub mod snapshot;

use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::HashMap;

pub use history::CommandHistory;
pub use persistence::SledStore;
pub use snapshot::SnapshotStore;

/// Key holding the serialized mount export
pub const FILE_TREE_KEY: &str = "file_tree";

/// Key holding the serialized command history
pub const FILE_TREE_HISTORY_KEY: &str = "file_tree_history";

/// Key-value store interface
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.write().remove(key);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
