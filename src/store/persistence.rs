//! Sled-backed key-value store

use crate::error::StorageError;
use crate::store::KeyValueStore;
use std::path::Path;

/// Persistent store in a sled database directory
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Temporary database, removed on drop
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec()).map(Some).map_err(|e| {
                StorageError::Backend(format!("Value for {} is not UTF-8: {}", key, e))
            }),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store");
        {
            let store = SledStore::open(&path).unwrap();
            store.set("file_tree", "{}").unwrap();
        }
        let store = SledStore::open(&path).unwrap();
        assert_eq!(store.get("file_tree").unwrap().as_deref(), Some("{}"));
        store.remove("file_tree").unwrap();
        assert_eq!(store.get("file_tree").unwrap(), None);
    }

    #[test]
    fn test_temporary_store() {
        let store = SledStore::temporary().unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }
}
