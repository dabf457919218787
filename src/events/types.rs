//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the gallery index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory scan events
    Scan(ScanEvent),
    /// Index store and lifecycle events
    Index(IndexEvent),
}

/// Events during a directory scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { directory: PathBuf },
    /// An image was accepted into the scan result
    ImageFound { path: PathBuf, group_key: String },
    /// A file was skipped but scanning continues
    Error { path: PathBuf, message: String },
    /// The directory does not exist; nothing was indexed
    NotFound { directory: PathBuf },
    /// Scanning completed
    Completed { total_images: usize, skipped: usize },
}

/// Events from the index store and its coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexEvent {
    /// Persisted entries were loaded
    Loaded { total_entries: usize },
    /// The whole index was replaced by a scan
    Replaced { total_entries: usize },
    /// An entry was removed
    Removed { path: PathBuf, file_deleted: bool },
    /// The lifecycle state changed
    StateChanged { state: String },
}
