use crate::utils::time::hms;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of one completed work session.
///
/// `worked_duration + break_duration == end - start`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(with = "hms")]
    pub worked_duration: Duration,
    #[serde(with = "hms")]
    pub break_duration: Duration,
}

impl HistoryEntry {
    pub fn worked_seconds(&self) -> i64 {
        self.worked_duration.num_seconds()
    }

    pub fn break_seconds(&self) -> i64 {
        self.break_duration.num_seconds()
    }
}
