//! Time utilities: elapsed-time arithmetic, `H:MM:SS` formatting/parsing and
//! local calendar boundaries.
//!
//! Every duration in the crate goes through here, so the format/parse pair
//! is the single source of truth for the `H:MM:SS` round trip.

use crate::errors::{AppError, AppResult};
use crate::models::tracking_state::BreakInterval;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// `end - start`, refusing negative results.
pub fn checked_elapsed(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Duration> {
    if end < start {
        return Err(AppError::ClockSkew {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
    }
    Ok(end - start)
}

/// `end - start`, clamped to zero (and logged) when the clock went backwards.
pub fn elapsed(start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
    match checked_elapsed(start, end) {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "negative duration clamped to zero");
            Duration::zero()
        }
    }
}

pub fn sum_breaks(breaks: &[BreakInterval]) -> Duration {
    breaks
        .iter()
        .fold(Duration::zero(), |acc, b| acc + elapsed(b.start, b.end))
}

/// Render as `H:MM:SS`. Hours are not wrapped at 24, sub-seconds are dropped,
/// negative input renders as `0:00:00`.
pub fn format_hms(d: Duration) -> String {
    let total = d.num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Exact inverse of [`format_hms`].
pub fn parse_hms(s: &str) -> AppResult<Duration> {
    let invalid = || AppError::InvalidDuration(s.to_string());

    let mut parts = s.split(':');
    let (Some(h), Some(m), Some(sec), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(h) || m.len() != 2 || sec.len() != 2 || !all_digits(m) || !all_digits(sec) {
        return Err(invalid());
    }

    let hours: i64 = h.parse().map_err(|_| invalid())?;
    let minutes: i64 = m.parse().map_err(|_| invalid())?;
    let seconds: i64 = sec.parse().map_err(|_| invalid())?;

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    hours
        .checked_mul(3600)
        .and_then(|t| t.checked_add(minutes * 60 + seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(invalid)
}

pub fn hours(d: Duration) -> f64 {
    d.num_seconds() as f64 / 3600.0
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// First instant of `date` in `tz`. When local midnight falls into a DST gap,
/// the first existing instant of that day is used.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    for hour in 0..24 {
        if let Some(naive) = date.and_hms_opt(hour, 0, 0)
            && let Some(local) = tz.from_local_datetime(&naive).earliest()
        {
            return local.with_timezone(&Utc);
        }
    }
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn start_of_day(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    local_midnight(local_date(now, tz), tz)
}

/// Monday 00:00 of the ISO week containing `now`.
pub fn start_of_week(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let today = local_date(now, tz);
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    local_midnight(monday, tz)
}

pub fn start_of_month(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let today = local_date(now, tz);
    let first = today.with_day(1).unwrap_or(today);
    local_midnight(first, tz)
}

/// Serde adapter: `chrono::Duration` ⇔ `"H:MM:SS"`.
pub mod hms {
    use super::{format_hms, parse_hms};
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_hms(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        parse_hms(&raw).map_err(de::Error::custom)
    }
}
