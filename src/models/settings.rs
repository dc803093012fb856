use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

fn default_daily() -> f64 {
    8.0
}
fn default_weekly() -> f64 {
    40.0
}
fn default_break_minutes() -> i64 {
    30
}

/// Expected hours and display preferences, per user (or the global defaults).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_daily")]
    pub expected_daily_hours: f64,
    #[serde(default = "default_weekly")]
    pub expected_weekly_hours: f64,
    /// Informational only, never subtracted automatically.
    #[serde(default = "default_break_minutes")]
    pub break_minutes: i64,
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expected_daily_hours: default_daily(),
            expected_weekly_hours: default_weekly(),
            break_minutes: default_break_minutes(),
            dark_mode: false,
        }
    }
}

/// Partial update posted to `/settings`; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub expected_daily_hours: Option<f64>,
    pub expected_weekly_hours: Option<f64>,
    pub break_minutes: Option<i64>,
    pub dark_mode: Option<bool>,
}

fn check_hours(name: &str, value: f64, max: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 || value > max {
        return Err(AppError::InvalidSettings(format!(
            "{name} must be between 0 and {max}, got {value}"
        )));
    }
    Ok(())
}

impl Settings {
    /// Apply `update` on a copy; `self` is untouched when validation fails.
    pub fn merged(&self, update: &SettingsUpdate) -> AppResult<Settings> {
        let mut next = *self;

        if let Some(h) = update.expected_daily_hours {
            check_hours("expected_daily_hours", h, 24.0)?;
            next.expected_daily_hours = h;
        }
        if let Some(h) = update.expected_weekly_hours {
            check_hours("expected_weekly_hours", h, 168.0)?;
            next.expected_weekly_hours = h;
        }
        if let Some(m) = update.break_minutes {
            if !(0..=1440).contains(&m) {
                return Err(AppError::InvalidSettings(format!(
                    "break_minutes must be between 0 and 1440, got {m}"
                )));
            }
            next.break_minutes = m;
        }
        if let Some(d) = update.dark_mode {
            next.dark_mode = d;
        }

        Ok(next)
    }
}
