//! Weekly buckets for the history chart and period filtering for reports.

use crate::models::day_summary::WeeklyChart;
use crate::models::history_entry::HistoryEntry;
use crate::utils::date::{iso_week_key, iso_week_label};
use crate::utils::time::{hours, local_date, round_to};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Group entries by the ISO week (in `tz`) of their start and sum the
/// worked hours of each week, oldest week first.
pub fn weekly_totals(entries: &[HistoryEntry], tz: Tz) -> WeeklyChart {
    let mut buckets: BTreeMap<(i32, u32), Duration> = BTreeMap::new();

    for e in entries {
        let key = iso_week_key(local_date(e.start, tz));
        *buckets.entry(key).or_insert_with(Duration::zero) += e.worked_duration;
    }

    let mut chart = WeeklyChart::default();
    for ((year, week), worked) in buckets {
        chart.labels.push(iso_week_label(year, week));
        chart.hours.push(round_to(hours(worked), 2));
    }
    chart
}

/// Entries whose start lies in `[from, to)`, in chronological order.
pub fn entries_in(entries: &[HistoryEntry], from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<HistoryEntry> {
    let mut out: Vec<HistoryEntry> = entries
        .iter()
        .filter(|e| e.start >= from && e.start < to)
        .cloned()
        .collect();
    out.sort_by_key(|e| e.start);
    out
}
