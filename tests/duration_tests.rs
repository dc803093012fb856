use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use rtimetracker::errors::AppError;
use rtimetracker::models::history_entry::HistoryEntry;
use rtimetracker::utils::time::{
    checked_elapsed, elapsed, local_midnight, start_of_month, start_of_week,
};
use rtimetracker::utils::{format_hms, parse_hms};

mod common;
use common::utc;

#[test]
fn test_format_hms() {
    assert_eq!(format_hms(Duration::zero()), "0:00:00");
    assert_eq!(format_hms(Duration::seconds(59)), "0:00:59");
    assert_eq!(format_hms(Duration::minutes(450)), "7:30:00");
    assert_eq!(format_hms(Duration::hours(100) + Duration::seconds(5)), "100:00:05");
}

#[test]
fn test_format_hms_clamps_negative_and_drops_subseconds() {
    assert_eq!(format_hms(Duration::seconds(-30)), "0:00:00");
    assert_eq!(format_hms(Duration::milliseconds(61_999)), "0:01:01");
}

#[test]
fn test_parse_inverts_format() {
    for secs in [0, 1, 59, 60, 3599, 3600, 27_000, 86_399, 86_400, 360_005] {
        let d = Duration::seconds(secs);
        assert_eq!(parse_hms(&format_hms(d)).unwrap(), d, "{secs}s");
    }
}

#[test]
fn test_parse_rejects_malformed_strings() {
    for bad in [
        "", "7:30", "7:3:00", "7:30:0", "7:60:00", "7:00:60", "a:00:00", "-1:00:00",
        "1:00:00:00", " 1:00:00", "1:00:00 ",
    ] {
        let err = parse_hms(bad).unwrap_err();
        assert!(matches!(err, AppError::InvalidDuration(_)), "{bad:?}");
    }
}

#[test]
fn test_history_entry_serializes_durations_as_hms() {
    let entry = HistoryEntry {
        start: utc(2024, 3, 4, 9, 0, 0),
        end: utc(2024, 3, 4, 17, 0, 0),
        worked_duration: Duration::minutes(450),
        break_duration: Duration::minutes(30),
    };

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["worked_duration"], "7:30:00");
    assert_eq!(json["break_duration"], "0:30:00");

    let back: HistoryEntry = serde_json::from_value(json).unwrap();
    assert_eq!(back, entry);
}

#[test]
fn test_negative_elapsed_is_clock_skew() {
    let a = utc(2024, 3, 4, 10, 0, 0);
    let b = utc(2024, 3, 4, 9, 0, 0);

    assert!(matches!(checked_elapsed(a, b), Err(AppError::ClockSkew { .. })));
    assert_eq!(elapsed(a, b), Duration::zero());
    assert_eq!(elapsed(b, a), Duration::hours(1));
}

#[test]
fn test_local_boundaries() {
    let rome: Tz = "Europe/Rome".parse().unwrap();
    // Wednesday 2024-03-06 10:00 in Rome (UTC+1)
    let now = utc(2024, 3, 6, 9, 0, 0);

    assert_eq!(start_of_week(now, rome), utc(2024, 3, 3, 23, 0, 0));
    assert_eq!(start_of_month(now, rome), utc(2024, 2, 29, 23, 0, 0));
}

#[test]
fn test_local_midnight_inside_dst_gap() {
    // clocks jumped from 00:00 to 01:00 on this day
    let sao_paulo: Tz = "America/Sao_Paulo".parse().unwrap();
    let day = NaiveDate::from_ymd_opt(2018, 11, 4).unwrap();

    assert_eq!(local_midnight(day, sao_paulo), utc(2018, 11, 4, 3, 0, 0));
}
