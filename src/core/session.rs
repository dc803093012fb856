//! Work/break session state machine.
//!
//! `Stopped → Working ⇄ OnBreak → Stopped`. Every transition is total: a call
//! that does not fit the current status returns a [`TransitionError`] and
//! leaves the state exactly as it was, so duplicate submissions are harmless.

use crate::errors::TransitionError;
use crate::models::history_entry::HistoryEntry;
use crate::models::status::Status;
use crate::models::tracking_state::{BreakInterval, TrackingState};
use crate::utils::time::{elapsed, sum_breaks};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    BreakStart,
    BreakEnd,
    Stop,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::BreakStart => "break_start",
            Action::BreakEnd => "break_end",
            Action::Stop => "stop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// State moved to the given status.
    Applied(Status),
    /// `stop` closed the session; the entry must be appended to the history.
    Completed(HistoryEntry),
}

impl TrackingState {
    pub fn apply(&mut self, action: Action, now: DateTime<Utc>) -> Result<Transition, TransitionError> {
        match action {
            Action::Start => self.start(now),
            Action::BreakStart => self.break_start(now),
            Action::BreakEnd => self.break_end(now),
            Action::Stop => self.stop(now),
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Transition, TransitionError> {
        if self.status.is_active() {
            return Err(TransitionError::InvalidTransition {
                action: Action::Start.as_str(),
                status: self.status,
            });
        }

        *self = TrackingState {
            status: Status::Working,
            start_time: Some(now),
            break_start_time: None,
            accumulated_breaks: Vec::new(),
        };
        Ok(Transition::Applied(Status::Working))
    }

    pub fn break_start(&mut self, now: DateTime<Utc>) -> Result<Transition, TransitionError> {
        match self.status {
            Status::Working => {
                self.break_start_time = Some(now);
                self.status = Status::OnBreak;
                Ok(Transition::Applied(Status::OnBreak))
            }
            Status::OnBreak => Err(TransitionError::InvalidTransition {
                action: Action::BreakStart.as_str(),
                status: self.status,
            }),
            Status::Stopped => Err(TransitionError::MissingState {
                action: Action::BreakStart.as_str(),
            }),
        }
    }

    pub fn break_end(&mut self, now: DateTime<Utc>) -> Result<Transition, TransitionError> {
        match (self.status, self.break_start_time) {
            (Status::OnBreak, Some(open)) => {
                self.close_break(open, now);
                Ok(Transition::Applied(Status::Working))
            }
            (Status::Stopped, _) => Err(TransitionError::MissingState {
                action: Action::BreakEnd.as_str(),
            }),
            _ => Err(TransitionError::InvalidTransition {
                action: Action::BreakEnd.as_str(),
                status: self.status,
            }),
        }
    }

    /// Closes the session. An open break is closed at `now` first, so the
    /// break time is never counted as work.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Transition, TransitionError> {
        let Some(start) = self.start_time.filter(|_| self.status.is_active()) else {
            return Err(TransitionError::MissingState {
                action: Action::Stop.as_str(),
            });
        };

        if let Some(open) = self.break_start_time {
            self.close_break(open, now);
        }

        let total = elapsed(start, now);
        let breaks = sum_breaks(&self.accumulated_breaks).min(total);
        let entry = HistoryEntry {
            start,
            end: now.max(start),
            worked_duration: total - breaks,
            break_duration: breaks,
        };

        self.reset();
        Ok(Transition::Completed(entry))
    }

    /// Worked time of the running session up to `now` (zero when stopped).
    pub fn elapsed_worked(&self, now: DateTime<Utc>) -> Duration {
        let Some(start) = self.start_time else {
            return Duration::zero();
        };

        let open_break = self
            .break_start_time
            .map(|b| elapsed(b, now))
            .unwrap_or_else(Duration::zero);
        let breaks = sum_breaks(&self.accumulated_breaks) + open_break;

        (elapsed(start, now) - breaks).max(Duration::zero())
    }

    fn close_break(&mut self, open: DateTime<Utc>, now: DateTime<Utc>) {
        self.accumulated_breaks.push(BreakInterval {
            start: open,
            end: now.max(open),
        });
        self.break_start_time = None;
        self.status = Status::Working;
    }
}
