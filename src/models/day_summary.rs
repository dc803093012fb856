use super::history_entry::HistoryEntry;
use super::settings::Settings;
use super::status::Status;
use crate::utils::time::hms;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DaySummary {
    #[serde(with = "hms")]
    pub worked: Duration,
    pub hours: f64,
    pub expected_hours: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekSummary {
    #[serde(with = "hms")]
    pub worked: Duration,
    pub hours: f64,
    pub expected_hours: f64,
    pub percent: f64,
    pub overtime_hours: f64,
}

/// Parallel sequences for charting: `labels[i]` ("2024-W01") ↔ `hours[i]`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WeeklyChart {
    pub labels: Vec<String>,
    pub hours: Vec<f64>,
}

/// Payload of `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub username: String,
    pub status: Status,
    pub start_time: Option<DateTime<Utc>>,
    pub break_start_time: Option<DateTime<Utc>>,
    #[serde(with = "hms")]
    pub current_session: Duration,
    pub today: DaySummary,
    pub week: WeekSummary,
    pub dark_mode: bool,
}

/// Payload of `GET /history`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub username: String,
    pub entries: Vec<HistoryEntry>,
    pub weekly: WeeklyChart,
    pub settings: Settings,
}
