//! Today / this-week totals, completion percentage and overtime.

use crate::models::day_summary::{DaySummary, WeekSummary};
use crate::models::history_entry::HistoryEntry;
use crate::models::settings::Settings;
use crate::utils::time::{hours, round_to, start_of_day, start_of_week};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

/// Sum of `worked_duration` for entries whose start lies in `[from, to)`.
pub fn worked_between(entries: &[HistoryEntry], from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    entries
        .iter()
        .filter(|e| e.start >= from && e.start < to)
        .fold(Duration::zero(), |acc, e| acc + e.worked_duration)
}

/// `100 * worked / expected`, one decimal. An expected value of zero (or
/// less) yields `0.0`: there is no target to measure against.
pub fn percent(worked_hours: f64, expected_hours: f64) -> f64 {
    if expected_hours <= 0.0 || !expected_hours.is_finite() {
        return 0.0;
    }
    round_to(100.0 * worked_hours / expected_hours, 1)
}

/// Hours above the weekly target, never negative.
pub fn overtime(worked_week_hours: f64, expected_weekly_hours: f64) -> f64 {
    (worked_week_hours - expected_weekly_hours).max(0.0)
}

pub fn summarize_today(
    entries: &[HistoryEntry],
    settings: &Settings,
    now: DateTime<Utc>,
    tz: Tz,
) -> DaySummary {
    let worked = worked_between(entries, start_of_day(now, tz), now);
    let h = hours(worked);

    DaySummary {
        worked,
        hours: round_to(h, 2),
        expected_hours: settings.expected_daily_hours,
        percent: percent(h, settings.expected_daily_hours),
    }
}

pub fn summarize_week(
    entries: &[HistoryEntry],
    settings: &Settings,
    now: DateTime<Utc>,
    tz: Tz,
) -> WeekSummary {
    let worked = worked_between(entries, start_of_week(now, tz), now);
    let h = hours(worked);

    WeekSummary {
        worked,
        hours: round_to(h, 2),
        expected_hours: settings.expected_weekly_hours,
        percent: percent(h, settings.expected_weekly_hours),
        overtime_hours: round_to(overtime(h, settings.expected_weekly_hours), 2),
    }
}
