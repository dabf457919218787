//! Recency windows for the timeline view.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// How far back the timeline looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    /// Last 24 hours
    Day,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Any other span
    Custom(#[serde(with = "seconds")] Duration),
}

impl TimeWindow {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
            Self::Custom(duration) => *duration,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Day => "Last 24 hours".to_string(),
            Self::Week => "Last 7 days".to_string(),
            Self::Month => "Last 30 days".to_string(),
            Self::Custom(duration) => format!("Last {} hours", duration.num_hours()),
        }
    }
}

impl From<Duration> for TimeWindow {
    fn from(duration: Duration) -> Self {
        Self::Custom(duration)
    }
}

mod seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(Duration::seconds)
    }
}
