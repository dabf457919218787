//! Persisted record format.
//!
//! The blob is a JSON array of `{"path", "date", "contactId"}` objects.
//! Other tooling reads the same value, so field names and the ISO-8601
//! date encoding must stay stable.

use crate::core::entry::{Entry, UNKNOWN_GROUP};
use crate::error::StoreError;
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// One entry as it appears in the persisted blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub path: String,
    pub date: String,
    #[serde(rename = "contactId")]
    pub contact_id: String,
}

impl TryFrom<&Entry> for StoredRecord {
    type Error = StoreError;

    /// Fails for paths that are not valid UTF-8 rather than storing a lossy copy
    fn try_from(entry: &Entry) -> Result<Self, Self::Error> {
        let path = entry.path().to_str().ok_or_else(|| {
            StoreError::SerializationFailed(format!(
                "path is not valid UTF-8: {}",
                entry.path().display()
            ))
        })?;

        Ok(Self {
            path: path.to_string(),
            date: format_timestamp(entry.timestamp()),
            contact_id: entry.group_key().to_string(),
        })
    }
}

/// Encode entries in order. Same input always yields the same bytes.
pub fn encode(entries: &[Entry]) -> Result<String, StoreError> {
    let records = entries
        .iter()
        .map(StoredRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    serde_json::to_string(&records).map_err(|e| StoreError::SerializationFailed(e.to_string()))
}

/// Decode a blob, substituting defaults for damaged fields.
///
/// Never fails: an unreadable blob yields no entries, a record without a
/// usable path is dropped, a missing group key becomes [`UNKNOWN_GROUP`]
/// and a missing or invalid date becomes `now`. Later duplicates of a path
/// are dropped.
pub fn decode(blob: &str, now: DateTime<Utc>) -> Vec<Entry> {
    let records = match serde_json::from_str::<Value>(blob) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!("Persisted index is not a list; starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "Persisted index is not valid JSON; starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let Some(path) = record.get("path").and_then(Value::as_str).filter(|p| !p.is_empty()) else {
            warn!(index, "Dropping persisted record without a path");
            continue;
        };

        if !seen.insert(path.to_string()) {
            warn!(path, "Dropping duplicate persisted record");
            continue;
        }

        let group_key = record
            .get("contactId")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_GROUP);

        let timestamp = match record.get("date").and_then(Value::as_str).and_then(parse_timestamp) {
            Some(timestamp) => timestamp,
            None => {
                warn!(path, "Persisted record has no valid date; using current time");
                now
            }
        };

        entries.push(Entry::new(path, timestamp, group_key));
    }

    entries
}

/// RFC 3339 in UTC, keeping sub-second digits only when present.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an ISO-8601 date. Values without an offset are read as local time.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
