//! # Grouping Module
//!
//! Read-only views derived from the index: albums per group key,
//! recency-windowed timelines and text search over albums.
//!
//! Every function here is pure over the slice it is given, so callers pass
//! a fresh snapshot and nothing is cached.

mod window;

pub use window::TimeWindow;

use crate::core::entry::Entry;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Entries sharing a group key, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Album {
    key: String,
    entries: Vec<Entry>,
}

impl Album {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name shown for the album.
    ///
    /// Contact names are not resolved, so this is the group key itself.
    pub fn display_name(&self) -> String {
        display_name(&self.key)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Newest entry, used as the album cover
    pub fn cover(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn newest(&self) -> Option<DateTime<Utc>> {
        self.cover().map(Entry::timestamp)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display name for a group key
pub fn display_name(group_key: &str) -> String {
    group_key.to_string()
}

fn sort_newest_first(entries: &mut [Entry]) {
    // Stable: equal timestamps keep index order
    entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}

/// Partition entries by group key, each partition newest first.
pub fn group_by_key(entries: &[Entry]) -> HashMap<String, Vec<Entry>> {
    let mut groups: HashMap<String, Vec<Entry>> = HashMap::new();

    for entry in entries {
        groups
            .entry(entry.group_key().to_string())
            .or_default()
            .push(entry.clone());
    }

    for members in groups.values_mut() {
        sort_newest_first(members);
    }

    groups
}

/// Albums ordered by their newest entry, newest first.
///
/// Albums whose newest entries tie are ordered by key.
pub fn ordered_albums(entries: &[Entry]) -> Vec<Album> {
    let mut albums: Vec<Album> = group_by_key(entries)
        .into_iter()
        .map(|(key, entries)| Album { key, entries })
        .collect();

    albums.sort_by(|a, b| b.newest().cmp(&a.newest()).then_with(|| a.key.cmp(&b.key)));
    albums
}

/// Entries strictly newer than `now - window`, newest first.
pub fn entries_since(entries: &[Entry], window: Duration, now: DateTime<Utc>) -> Vec<Entry> {
    let cutoff = now - window;

    let mut recent: Vec<Entry> = entries
        .iter()
        .filter(|e| e.timestamp() > cutoff)
        .cloned()
        .collect();

    sort_newest_first(&mut recent);
    recent
}

/// Albums whose display name contains `query`, ignoring case.
///
/// A blank query keeps every album. Order is preserved.
pub fn filter_albums(albums: &[Album], query: &str) -> Vec<Album> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return albums.to_vec();
    }

    albums
        .iter()
        .filter(|album| album.display_name().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
