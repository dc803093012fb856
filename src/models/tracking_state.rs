use super::status::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One closed break inside a running session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreakInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Per-user live tracking state, persisted as one JSON document.
///
/// Invariants kept by `core::session`:
/// - `break_start_time.is_some()` ⇔ `status == OnBreak`
/// - `start_time.is_none()` ⇒ `status == Stopped` and `accumulated_breaks` is empty
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackingState {
    pub status: Status,
    pub start_time: Option<DateTime<Utc>>,
    pub break_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accumulated_breaks: Vec<BreakInterval>,
}

impl TrackingState {
    /// Back to `Stopped` with every field emptied.
    pub fn reset(&mut self) {
        *self = TrackingState::default();
    }
}

impl TrackingState {
    /// Whether the fields agree with `status`. A stored document that fails
    /// this check is treated as corrupt.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            Status::Stopped => {
                self.start_time.is_none()
                    && self.break_start_time.is_none()
                    && self.accumulated_breaks.is_empty()
            }
            Status::Working => self.start_time.is_some() && self.break_start_time.is_none(),
            Status::OnBreak => self.start_time.is_some() && self.break_start_time.is_some(),
        }
    }
}
