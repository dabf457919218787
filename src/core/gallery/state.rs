//! Index lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the index is in its lifecycle
///
/// ```text
/// Uninitialized -> Loading -> Ready | PermissionBlocked
/// Ready -> Scanning -> Ready
/// PermissionBlocked -> Loading (after a granted retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexState {
    Uninitialized,
    Loading,
    Ready,
    PermissionBlocked,
    Scanning,
}

impl IndexState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::PermissionBlocked => "permission_blocked",
            Self::Scanning => "scanning",
        }
    }

    /// Whether a scan may start from this state
    pub fn can_scan(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
