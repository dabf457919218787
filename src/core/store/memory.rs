//! In-memory blob store for tests and throwaway sessions.

use super::BlobStore;
use crate::error::StoreError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// In-memory blob store
///
/// Shared through an `Arc`, it outlives any single [`IndexStore`](super::IndexStore),
/// which is how tests simulate a process restart.
pub struct InMemoryBlobStore {
    values: RwLock<HashMap<(String, String), String>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored values across all collections
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Corrupted {
        path: PathBuf::from("memory"),
    }
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.read().map_err(|_| poisoned())?;
        Ok(values
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }

    fn put(&self, collection: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().map_err(|_| poisoned())?;
        values.insert((collection.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}
