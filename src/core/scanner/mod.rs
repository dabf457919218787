//! # Scanner Module
//!
//! Lists the image directory and turns each supported file into an
//! [`Entry`](crate::core::entry::Entry).
//!
//! Only direct children are considered; the directory is small enough that
//! results are fully materialized before being returned.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - WebP (.webp)
//!
//! ## Example
//! ```rust,ignore
//! use contact_gallery::core::scanner::{DirectoryScanner, ImageScanner, ScanConfig};
//!
//! let scanner = DirectoryScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/sdcard/WhatsApp Images"))?;
//! ```

mod filter;
mod walker;

pub use filter::{ImageFilter, DEFAULT_EXTENSIONS};
pub use walker::{DirectoryScanner, ScanConfig};

use crate::core::entry::Entry;
use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image formats the scanner recognizes by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "webp" => ImageFormat::WebP,
            _ => ImageFormat::Unknown,
        }
    }

    /// Check if this format is supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Entries for every file that was accepted and stat'ed
    pub entries: Vec<Entry>,
    /// Files that were skipped (non-fatal)
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    pub fn skipped(&self) -> usize {
        self.errors.len()
    }
}

/// Trait for directory scanners
///
/// Implement this trait to substitute the filesystem (e.g., for testing).
pub trait ImageScanner: Send + Sync {
    /// Scan a directory.
    ///
    /// Returns `ScanError::DirectoryNotFound` when the directory is absent;
    /// per-file failures are reported in [`ScanResult::errors`].
    fn scan(&self, directory: &Path) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(
        &self,
        directory: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError>;
}
