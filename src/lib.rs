//! # Contact Gallery
//!
//! Indexes the images a chat app drops into a single directory and groups
//! them into per-contact albums by file name.
//!
//! ## Architecture
//! The library is a GUI-agnostic core; rendering is left to the caller:
//! - `core` - Entry model, classifier, scanner, index store, grouping views
//!   and the lifecycle coordinator
//! - `config` - Directory, store and scanner settings
//! - `events` - Optional progress notifications
//! - `error` - Error types

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{GalleryError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Calling it more
/// than once is harmless.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
