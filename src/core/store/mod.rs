//! # Store Module
//!
//! The authoritative set of indexed entries and its persisted snapshot.
//!
//! Every mutation writes the full snapshot to the backend before the
//! in-memory set is swapped, so a restart always sees what was last
//! visible in memory.
//!
//! ## Backends
//! - `SqliteBlobStore` - Persistent storage using SQLite
//! - `InMemoryBlobStore` - For testing

mod memory;
pub mod record;
mod sqlite;
mod traits;

pub use memory::InMemoryBlobStore;
pub use sqlite::SqliteBlobStore;
pub use traits::BlobStore;

use crate::core::entry::Entry;
use crate::error::StoreError;
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Default collection holding the index
pub const DEFAULT_COLLECTION: &str = "gallery";

/// Key of the serialized entry list inside the collection
pub const ENTRIES_KEY: &str = "images";

/// In-memory index backed by a [`BlobStore`]
pub struct IndexStore {
    backend: Arc<dyn BlobStore>,
    collection: String,
    entries: RwLock<Vec<Entry>>,
}

impl IndexStore {
    /// Create an empty store without reading the backend
    pub fn new(backend: Arc<dyn BlobStore>, collection: impl Into<String>) -> Self {
        Self {
            backend,
            collection: collection.into(),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Create a store and load whatever the backend holds
    pub fn open(backend: Arc<dyn BlobStore>, collection: impl Into<String>) -> Result<Self, StoreError> {
        let store = Self::new(backend, collection);
        store.load()?;
        Ok(store)
    }

    /// Read the persisted snapshot and install it as the current set.
    ///
    /// Damaged records are repaired or dropped rather than failing the load;
    /// only a backend read failure is an error.
    pub fn load(&self) -> Result<Vec<Entry>, StoreError> {
        let loaded = match self.backend.get(&self.collection, ENTRIES_KEY)? {
            Some(blob) => record::decode(&blob, Utc::now()),
            None => Vec::new(),
        };

        info!(collection = %self.collection, entries = loaded.len(), "Loaded index");

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *entries = loaded.clone();
        Ok(loaded)
    }

    /// Discard the current set and install `entries`, then persist.
    ///
    /// Entries sharing a path keep only the first occurrence. If persisting
    /// fails the previous set stays in place.
    pub fn replace_all(&self, entries: Vec<Entry>) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        let incoming = entries.len();
        let unique: Vec<Entry> = entries
            .into_iter()
            .filter(|e| seen.insert(e.path().to_path_buf()))
            .collect();

        if unique.len() != incoming {
            warn!(dropped = incoming - unique.len(), "Dropped entries with duplicate paths");
        }

        let mut current = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.write_snapshot(&unique)?;
        *current = unique;

        info!(entries = current.len(), "Replaced index");
        Ok(())
    }

    /// Remove the entry at `path`, then persist.
    ///
    /// Returns whether an entry was removed; an absent path leaves both the
    /// set and the backend untouched.
    pub fn remove(&self, path: &Path) -> Result<bool, StoreError> {
        let mut current = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        let Some(position) = current.iter().position(|e| e.path() == path) else {
            debug!(path = %path.display(), "Nothing to remove");
            return Ok(false);
        };

        let mut remaining = current.clone();
        remaining.remove(position);
        self.write_snapshot(&remaining)?;
        *current = remaining;

        debug!(path = %path.display(), "Removed entry");
        Ok(true)
    }

    /// Write the current set to the backend
    pub fn persist(&self) -> Result<(), StoreError> {
        let current = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        self.write_snapshot(&current)
    }

    /// The serialized form [`persist`](Self::persist) would write
    pub fn snapshot_blob(&self) -> Result<String, StoreError> {
        let current = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        record::encode(&current)
    }

    /// Copy of the current set
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn get(&self, path: &Path) -> Option<Entry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|e| e.path() == path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn write_snapshot(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let blob = record::encode(entries)?;
        self.backend.put(&self.collection, ENTRIES_KEY, &blob)
    }
}
