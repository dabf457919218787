//! # Core Module
//!
//! The GUI-agnostic indexing engine.
//!
//! ## Modules
//! - `entry` - One indexed image
//! - `classifier` - Derives the album key from a file name
//! - `scanner` - Lists the image directory
//! - `store` - Authoritative entry set and its persisted snapshot
//! - `grouping` - Albums, recency windows and album search
//! - `gallery` - Lifecycle, single-scan policy and deletion

pub mod classifier;
pub mod entry;
pub mod gallery;
pub mod grouping;
pub mod scanner;
pub mod store;

// Re-export commonly used types
pub use entry::{Entry, UNKNOWN_GROUP};
pub use gallery::{DeleteOutcome, Gallery, IndexState, ScanOutcome};
pub use grouping::{Album, TimeWindow};
pub use store::{BlobStore, IndexStore};
