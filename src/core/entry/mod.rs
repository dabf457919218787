//! # Entry Module
//!
//! The value type for one indexed image.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Group key assigned when a file name carries no recognizable pattern
pub const UNKNOWN_GROUP: &str = "Unknown";

/// One indexed image.
///
/// Fields are fixed at construction; the index only ever replaces or
/// removes whole entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    path: PathBuf,
    timestamp: DateTime<Utc>,
    group_key: String,
}

impl Entry {
    /// Create an entry. An empty or blank group key becomes [`UNKNOWN_GROUP`].
    pub fn new(path: impl Into<PathBuf>, timestamp: DateTime<Utc>, group_key: impl Into<String>) -> Self {
        let group_key = group_key.into();
        let group_key = if group_key.trim().is_empty() {
            UNKNOWN_GROUP.to_string()
        } else {
            group_key
        };

        Self {
            path: path.into(),
            timestamp,
            group_key,
        }
    }

    /// Location on disk; also the entry's identity within the index
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    /// File name component, for display
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Whether the entry's group key is the fallback sentinel
    pub fn is_unknown(&self) -> bool {
        self.group_key == UNKNOWN_GROUP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_group_key_falls_back_to_unknown() {
        let entry = Entry::new("/images/a.jpg", Utc::now(), "  ");
        assert_eq!(entry.group_key(), UNKNOWN_GROUP);
        assert!(entry.is_unknown());
    }

    #[test]
    fn group_key_is_kept_verbatim() {
        let entry = Entry::new("/images/IMG-WA0042.jpg", Utc::now(), "WA0042");
        assert_eq!(entry.group_key(), "WA0042");
        assert!(!entry.is_unknown());
    }

    #[test]
    fn file_name_is_last_component() {
        let entry = Entry::new("/images/IMG-20240101-WA0001.jpg", Utc::now(), "WA0001");
        assert_eq!(entry.file_name(), "IMG-20240101-WA0001.jpg");
    }
}
