//! # Classifier Module
//!
//! Maps an image file name to its album group key.
//!
//! Chat apps name received images like `IMG-20240312-WA0017.jpg`. The first
//! run of the literal prefix followed by digits (`WA0017`) becomes the group
//! key; anything else lands in [`UNKNOWN_GROUP`]. Matching is case-sensitive.

use crate::core::entry::UNKNOWN_GROUP;
use regex::Regex;
use std::sync::OnceLock;

/// Prefix used by [`classify`]
pub const DEFAULT_PREFIX: &str = "WA";

/// Classifier for a configurable literal prefix
#[derive(Debug, Clone)]
pub struct FilenameClassifier {
    pattern: Regex,
}

impl FilenameClassifier {
    /// Build a classifier matching `prefix` followed by one or more ASCII digits.
    pub fn new(prefix: &str) -> Self {
        let pattern = Regex::new(&format!("{}[0-9]+", regex::escape(prefix)))
            .unwrap_or_else(|_| default_pattern().clone());
        Self { pattern }
    }

    /// Group key for a file name; never fails.
    pub fn classify(&self, file_name: &str) -> String {
        self.pattern
            .find(file_name)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_GROUP.to_string())
    }
}

impl Default for FilenameClassifier {
    fn default() -> Self {
        Self {
            pattern: default_pattern().clone(),
        }
    }
}

fn default_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("WA[0-9]+").expect("static pattern is valid"))
}

/// Classify with the default `WA<digits>` pattern.
pub fn classify(file_name: &str) -> String {
    default_pattern()
        .find(file_name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_GROUP.to_string())
}
