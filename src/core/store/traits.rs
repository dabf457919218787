//! Blob store backend trait definition.

use crate::error::StoreError;

/// Key-value persistence for serialized index snapshots.
///
/// Values are grouped into named collections; the index keeps one value
/// under a fixed key in its collection.
pub trait BlobStore: Send + Sync {
    /// Read a value, `None` if nothing was stored under the key
    fn get(&self, collection: &str, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value, replacing any previous one
    fn put(&self, collection: &str, key: &str, value: &str) -> Result<(), StoreError>;
}
