//! Period reports: the rows and totals behind `GET /export` and the
//! `export` command.

use crate::core::calculator::weekly::entries_in;
use crate::errors::{AppError, AppResult};
use crate::models::history_entry::HistoryEntry;
use crate::utils::date::month_name;
use crate::utils::time::{format_hms, local_date, start_of_day, start_of_month, start_of_week};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            _ => Err(AppError::InvalidPeriod(s.to_string())),
        }
    }

    /// First instant of the period containing `now`.
    pub fn start(&self, now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        match self {
            Period::Daily => start_of_day(now, tz),
            Period::Weekly => start_of_week(now, tz),
            Period::Monthly => start_of_month(now, tz),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One session, formatted for output. Times are local to the report zone.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportRow {
    pub date: String,
    pub start: String,
    pub end: String,
    pub worked: String,
    #[serde(rename = "break")]
    pub break_: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub user: String,
    pub title: String,
    pub period: Period,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Local date of `from`.
    pub first_day: NaiveDate,
    pub rows: Vec<ReportRow>,
    pub total_worked: String,
    pub total_break: String,
}

pub(crate) const HEADERS: [&str; 5] = ["date", "start", "end", "worked", "break"];

impl Report {
    /// Sessions of `user` that started between the beginning of the period
    /// and `now`, with their totals.
    pub fn build(
        user: &str,
        period: Period,
        history: &[HistoryEntry],
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Report {
        let from = period.start(now, tz);
        // sessions stamped exactly at `now` are included
        let to = now + Duration::seconds(1);
        let selected = entries_in(history, from, to);

        let mut worked = Duration::zero();
        let mut breaks = Duration::zero();
        let rows = selected
            .iter()
            .map(|e| {
                worked += e.worked_duration;
                breaks += e.break_duration;
                row_for(e, tz)
            })
            .collect();

        Report {
            user: user.to_string(),
            title: title_for(user, period, local_date(from, tz)),
            period,
            from,
            to: now,
            first_day: local_date(from, tz),
            rows,
            total_worked: format_hms(worked),
            total_break: format_hms(breaks),
        }
    }

    pub fn headers(&self) -> Vec<&'static str> {
        HEADERS.to_vec()
    }

    /// Rows as string cells followed by a totals line, for tabular formats.
    pub fn table(&self) -> Vec<Vec<String>> {
        let mut out: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.start.clone(),
                    r.end.clone(),
                    r.worked.clone(),
                    r.break_.clone(),
                ]
            })
            .collect();

        out.push(vec![
            "Total".to_string(),
            String::new(),
            String::new(),
            self.total_worked.clone(),
            self.total_break.clone(),
        ]);
        out
    }
}

fn row_for(e: &HistoryEntry, tz: Tz) -> ReportRow {
    let start = e.start.with_timezone(&tz);
    let end = e.end.with_timezone(&tz);

    ReportRow {
        date: start.format("%Y-%m-%d").to_string(),
        start: start.format("%H:%M:%S").to_string(),
        end: end.format("%H:%M:%S").to_string(),
        worked: format_hms(e.worked_duration),
        break_: format_hms(e.break_duration),
    }
}

fn title_for(user: &str, period: Period, d: NaiveDate) -> String {
    match period {
        Period::Daily => format!("Daily report for {} - {}", user, d.format("%Y-%m-%d")),
        Period::Weekly => {
            let w = d.iso_week();
            format!("Weekly report for {} - {}-W{:02}", user, w.year(), w.week())
        }
        Period::Monthly => format!(
            "Monthly report for {} - {} {}",
            user,
            month_name(d.month()),
            d.year()
        ),
    }
}
