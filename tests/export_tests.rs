use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use rtimetracker::errors::AppError;
use rtimetracker::export::{ExportFormat, Period, Report, file_name};
use rtimetracker::models::history_entry::HistoryEntry;

mod common;
use common::utc;

fn entry(start: DateTime<Utc>, worked_min: i64, break_min: i64) -> HistoryEntry {
    HistoryEntry {
        start,
        end: start + Duration::minutes(worked_min + break_min),
        worked_duration: Duration::minutes(worked_min),
        break_duration: Duration::minutes(break_min),
    }
}

fn history() -> Vec<HistoryEntry> {
    vec![
        entry(utc(2024, 2, 28, 9, 0, 0), 480, 30),
        entry(utc(2024, 3, 1, 9, 0, 0), 240, 0),
        entry(utc(2024, 3, 4, 9, 0, 0), 450, 30),
        entry(utc(2024, 3, 6, 9, 0, 0), 450, 30),
    ]
}

fn now() -> DateTime<Utc> {
    // Wednesday
    utc(2024, 3, 6, 18, 0, 0)
}

#[test]
fn test_period_parse() {
    assert_eq!(Period::parse("daily").unwrap(), Period::Daily);
    assert_eq!(Period::parse("Weekly").unwrap(), Period::Weekly);
    assert_eq!(Period::parse("monthly").unwrap(), Period::Monthly);
    assert!(matches!(Period::parse("yearly"), Err(AppError::InvalidPeriod(_))));
}

#[test]
fn test_format_parse() {
    assert_eq!(ExportFormat::parse("PDF").unwrap(), ExportFormat::Pdf);
    assert!(matches!(
        ExportFormat::parse("docx"),
        Err(AppError::InvalidExportFormat(_))
    ));
}

#[test]
fn test_daily_report() {
    let report = Report::build("alice", Period::Daily, &history(), now(), Tz::UTC);

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].date, "2024-03-06");
    assert_eq!(report.rows[0].start, "09:00:00");
    assert_eq!(report.rows[0].end, "17:00:00");
    assert_eq!(report.total_worked, "7:30:00");
    assert_eq!(report.total_break, "0:30:00");
    assert_eq!(report.title, "Daily report for alice - 2024-03-06");
}

#[test]
fn test_weekly_and_monthly_reports() {
    let weekly = Report::build("alice", Period::Weekly, &history(), now(), Tz::UTC);
    assert_eq!(weekly.rows.len(), 2);
    assert_eq!(weekly.total_worked, "15:00:00");
    assert_eq!(weekly.title, "Weekly report for alice - 2024-W10");

    let monthly = Report::build("alice", Period::Monthly, &history(), now(), Tz::UTC);
    assert_eq!(monthly.rows.len(), 3);
    assert_eq!(monthly.total_worked, "19:00:00");
    assert_eq!(monthly.title, "Monthly report for alice - March 2024");
}

#[test]
fn test_report_rows_use_local_time() {
    let rome: Tz = "Europe/Rome".parse().unwrap();
    let report = Report::build("alice", Period::Daily, &history(), now(), rome);

    assert_eq!(report.rows[0].start, "10:00:00");
    assert_eq!(report.rows[0].end, "18:00:00");
}

#[test]
fn test_empty_report_still_has_totals() {
    let report = Report::build("bob", Period::Daily, &[], now(), Tz::UTC);
    assert!(report.rows.is_empty());
    assert_eq!(report.total_worked, "0:00:00");

    let table = report.table();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0][0], "Total");
}

#[test]
fn test_csv_rendering() {
    let report = Report::build("alice", Period::Weekly, &history(), now(), Tz::UTC);
    let csv = String::from_utf8(ExportFormat::Csv.render(&report).unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "date,start,end,worked,break");
    assert_eq!(lines[1], "2024-03-04,09:00:00,17:00:00,7:30:00,0:30:00");
    assert_eq!(lines.last().copied(), Some("Total,,,15:00:00,1:00:00"));
}

#[test]
fn test_empty_csv_keeps_header() {
    let report = Report::build("bob", Period::Daily, &[], now(), Tz::UTC);
    let csv = String::from_utf8(ExportFormat::Csv.render(&report).unwrap()).unwrap();

    assert_eq!(csv.lines().next(), Some("date,start,end,worked,break"));
    assert!(csv.contains("Total,,,0:00:00,0:00:00"));
}

#[test]
fn test_json_rendering() {
    let report = Report::build("alice", Period::Daily, &history(), now(), Tz::UTC);
    let bytes = ExportFormat::Json.render(&report).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["period"], "daily");
    assert_eq!(json["rows"][0]["break"], "0:30:00");
    assert_eq!(json["total_worked"], "7:30:00");
}

#[test]
fn test_binary_formats() {
    let report = Report::build("alice", Period::Monthly, &history(), now(), Tz::UTC);

    let xlsx = ExportFormat::Xlsx.render(&report).unwrap();
    assert!(xlsx.starts_with(b"PK"));

    let pdf = ExportFormat::Pdf.render(&report).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn test_download_name() {
    let report = Report::build("alice", Period::Weekly, &history(), now(), Tz::UTC);
    assert_eq!(
        file_name(&report, ExportFormat::Xlsx),
        "alice_weekly_2024-03-04.xlsx"
    );
    assert_eq!(ExportFormat::Pdf.content_type(), "application/pdf");
}
