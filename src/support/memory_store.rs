//! An in-process `KVStore` backed by a `Mutex<HashMap>` (spec §6.2).
//!
//! Used by the demo CLI (one process, no real persistence needed) and by
//! every test in this crate. A file- or database-backed `KVStore` is
//! exactly as legal per the trait; this crate just doesn't ship one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::storage::{KVStore, StorageError};

/// Cloning shares the underlying map: a clone kept by a test or caller
/// observes every write made through the clone handed to `VaultService`.
#[derive(Default, Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, StorageError> {
        self.data
            .lock()
            .map_err(|_| StorageError("memory store mutex poisoned".to_string()))
    }
}

impl KVStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .lock()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
