//! Upstream bulk-import activities.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Lifecycle state reported by the upstream for an import activity.
///
/// Unrecognised values are preserved verbatim in [`ActivityState::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    Initialized,
    Processing,
    Completed,
    Cancelled,
    Failed,
    TimedOut,
    #[serde(untagged)]
    Other(String),
}

impl ActivityState {
    /// Parse an upstream state string.
    pub fn parse(value: &str) -> Self {
        match value {
            "initialized" => Self::Initialized,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            "failed" => Self::Failed,
            "timed_out" => Self::TimedOut,
            other => Self::Other(other.to_string()),
        }
    }

    /// `completed` is the only state the poller treats as done.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A submitted bulk import, tracked only until completion is observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportActivity {
    pub activity_id: String,
    pub submitted_at: Timestamp,
    pub state: ActivityState,
}
