//! # Error Module
//!
//! Error types for the gallery index.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, keys, what went wrong
//! - **Degrade, don't abort** - most failures are recovered by the caller
//!   keeping its prior state

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Index store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while scanning the image directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File name is not valid UTF-8: {path}")]
    InvalidFileName { path: PathBuf },

    #[error("Failed to read modification time of {path}: {source}")]
    ReadMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur with the persisted index
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open index database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Index store at {path} is unusable. Delete this file and rescan.")]
    Corrupted { path: PathBuf },

    #[error("Failed to serialize index records: {0}")]
    SerializationFailed(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, GalleryError>;
