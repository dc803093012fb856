//! Request-scoped orchestration: lock the user, load, mutate, save.

use crate::core::calculator::{summary, weekly};
use crate::core::clock::Clock;
use crate::core::session::{Action, Transition};
use crate::db::Gateway;
use crate::errors::{AppError, AppResult};
use crate::export::report::{Period, Report};
use crate::models::day_summary::{Dashboard, HistoryView};
use crate::models::history_entry::HistoryEntry;
use crate::models::settings::{Settings, SettingsUpdate};
use crate::models::status::Status;
use crate::utils::time::format_hms;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// One mutex per username, created on first use.
///
/// Read-modify-write sequences for a user run under that user's mutex;
/// different users never contend.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn for_user(&self, user: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(user.to_string()).or_default().clone()
    }

    /// Run `f` while holding the user's lock; released when `f` returns.
    pub fn with_user<T>(&self, user: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.for_user(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

/// What happened to a posted action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    pub action: Action,
    /// False when the action did not fit the current status (no-op).
    pub applied: bool,
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<HistoryEntry>,
}

pub struct Tracker {
    gateway: Arc<dyn Gateway>,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
}

impl Tracker {
    pub fn new(gateway: Arc<dyn Gateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            clock,
            locks: UserLocks::default(),
        }
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Apply one action for `user`. Refused transitions are reported with
    /// `applied: false` and nothing is written.
    pub fn apply(&self, user: &str, action: Action) -> AppResult<ActionReport> {
        self.locks.with_user(user, || -> AppResult<ActionReport> {
            let mut state = self.gateway.load_state(user)?;
            let now = self.clock.now();

            match state.apply(action, now) {
                Ok(Transition::Applied(status)) => {
                    self.gateway.save(user, &state, None)?;
                    self.gateway.audit(action.as_str(), user, &format!("now {status}"));
                    info!(user, %action, %status, "transition applied");

                    Ok(ActionReport {
                        action,
                        applied: true,
                        status,
                        message: applied_message(action).to_string(),
                        entry: None,
                    })
                }
                Ok(Transition::Completed(entry)) => {
                    self.gateway.save(user, &state, Some(&entry))?;
                    let worked = format_hms(entry.worked_duration);
                    self.gateway.audit(
                        action.as_str(),
                        user,
                        &format!("worked {worked}, break {}", format_hms(entry.break_duration)),
                    );
                    info!(user, %action, worked = %worked, "session completed");

                    Ok(ActionReport {
                        action,
                        applied: true,
                        status: Status::Stopped,
                        message: format!("Work stopped, {worked} worked"),
                        entry: Some(entry),
                    })
                }
                Err(refused) => {
                    debug!(user, %action, reason = %refused, "transition ignored");
                    Ok(ActionReport {
                        action,
                        applied: false,
                        status: state.status,
                        message: refused.to_string(),
                        entry: None,
                    })
                }
            }
        })
    }

    pub fn dashboard(&self, user: &str) -> AppResult<Dashboard> {
        let doc = self.gateway.load(user)?;
        let now = self.clock.now();
        let tz = self.clock.zone();

        Ok(Dashboard {
            username: user.to_string(),
            status: doc.state.status,
            start_time: doc.state.start_time,
            break_start_time: doc.state.break_start_time,
            current_session: doc.state.elapsed_worked(now),
            today: summary::summarize_today(&doc.history, &doc.settings, now, tz),
            week: summary::summarize_week(&doc.history, &doc.settings, now, tz),
            dark_mode: doc.settings.dark_mode,
        })
    }

    pub fn history(&self, user: &str) -> AppResult<HistoryView> {
        let doc = self.gateway.load(user)?;
        let weekly = weekly::weekly_totals(&doc.history, self.clock.zone());

        Ok(HistoryView {
            username: user.to_string(),
            entries: doc.history,
            weekly,
            settings: doc.settings,
        })
    }

    pub fn settings(&self, user: &str) -> AppResult<Settings> {
        self.gateway.load_settings(user)
    }

    pub fn update_settings(&self, user: &str, update: &SettingsUpdate) -> AppResult<Settings> {
        self.locks.with_user(user, || -> AppResult<Settings> {
            let current = self.gateway.load_settings(user)?;
            let next = current.merged(update)?;
            self.gateway.save_settings(user, &next)?;
            self.gateway.audit(
                "settings",
                user,
                &format!(
                    "daily {}h, weekly {}h, break {}m",
                    next.expected_daily_hours, next.expected_weekly_hours, next.break_minutes
                ),
            );
            Ok(next)
        })
    }

    pub fn report(&self, user: &str, period: Period) -> AppResult<Report> {
        let doc = self.gateway.load(user)?;
        Ok(Report::build(
            user,
            period,
            &doc.history,
            self.clock.now(),
            self.clock.zone(),
        ))
    }

    pub fn login(&self, username: &str, password: &str) -> AppResult<()> {
        if self.gateway.verify(username, password)? {
            self.gateway.audit("login", username, "login succeeded");
            Ok(())
        } else {
            Err(AppError::AuthFailure)
        }
    }
}

fn applied_message(action: Action) -> &'static str {
    match action {
        Action::Start => "Work started",
        Action::BreakStart => "Break started",
        Action::BreakEnd => "Break ended",
        Action::Stop => "Work stopped",
    }
}
