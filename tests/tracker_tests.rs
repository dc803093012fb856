use chrono::Duration;
use chrono_tz::Tz;
use rtimetracker::config::{Config, MAX_SESSION_TTL_HOURS};
use rtimetracker::core::clock::{Clock, FixedClock};
use rtimetracker::core::session::Action;
use rtimetracker::core::tracker::{ActionReport, Tracker};
use rtimetracker::db::queries::count_history;
use rtimetracker::db::{Gateway, SqliteGateway};
use rtimetracker::errors::AppError;
use rtimetracker::export::Period;
use rtimetracker::models::settings::{Settings, SettingsUpdate};
use rtimetracker::models::status::Status;
use rtimetracker::server;
use rtimetracker::utils::format_hms;
use rusqlite::Connection;
use std::sync::{Arc, Barrier};
use std::thread;

mod common;
use common::{temp_db, test_env, utc};

#[test]
fn test_working_day_through_the_tracker() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    let t = &env.tracker;

    assert!(t.apply("alice", Action::Start).unwrap().applied);
    env.clock.set(utc(2024, 3, 4, 12, 0, 0));
    assert_eq!(t.apply("alice", Action::BreakStart).unwrap().status, Status::OnBreak);
    env.clock.set(utc(2024, 3, 4, 12, 30, 0));
    assert_eq!(t.apply("alice", Action::BreakEnd).unwrap().status, Status::Working);
    env.clock.set(utc(2024, 3, 4, 17, 0, 0));

    let report = t.apply("alice", Action::Stop).unwrap();
    let entry = report.entry.expect("completed entry");
    assert_eq!(format_hms(entry.worked_duration), "7:30:00");
    assert_eq!(format_hms(entry.break_duration), "0:30:00");

    let dash = t.dashboard("alice").unwrap();
    assert_eq!(dash.status, Status::Stopped);
    assert_eq!(dash.today.hours, 7.5);
    assert_eq!(dash.today.percent, 93.8);
    assert_eq!(dash.week.overtime_hours, 0.0);

    let history = t.history("alice").unwrap();
    assert_eq!(history.entries.len(), 1);
    assert_eq!(history.weekly.labels, vec!["2024-W10"]);
    assert_eq!(history.weekly.hours, vec![7.5]);
}

#[test]
fn test_refused_action_is_reported_not_failed() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    env.tracker.apply("alice", Action::Start).unwrap();
    env.clock.advance(Duration::minutes(5));

    let report = env.tracker.apply("alice", Action::Start).unwrap();

    assert!(!report.applied);
    assert_eq!(report.status, Status::Working);
    assert!(report.message.contains("cannot start"));
    assert_eq!(
        env.gateway.load_state("alice").unwrap().start_time,
        Some(utc(2024, 3, 4, 9, 0, 0))
    );
}

#[test]
fn test_live_session_in_dashboard() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    env.tracker.apply("alice", Action::Start).unwrap();
    env.clock.advance(Duration::minutes(95));

    let dash = env.tracker.dashboard("alice").unwrap();
    assert_eq!(dash.status, Status::Working);
    assert_eq!(format_hms(dash.current_session), "1:35:00");
    // nothing completed yet
    assert_eq!(dash.today.hours, 0.0);
}

#[test]
fn test_concurrent_stops_record_one_entry() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    env.tracker.apply("alice", Action::Start).unwrap();
    env.clock.set(utc(2024, 3, 4, 17, 0, 0));

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let tracker = env.tracker.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                tracker.apply("alice", Action::Stop).unwrap()
            })
        })
        .collect();

    let reports: Vec<ActionReport> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(reports.iter().filter(|r| r.applied).count(), 1);

    let conn = Connection::open(&env.db_path).unwrap();
    assert_eq!(count_history(&conn, "alice").unwrap(), 1);
}

#[test]
fn test_users_are_independent() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    env.tracker.apply("alice", Action::Start).unwrap();

    let bob = env.tracker.apply("bob", Action::Stop).unwrap();
    assert!(!bob.applied);
    assert_eq!(env.tracker.dashboard("alice").unwrap().status, Status::Working);
    assert_eq!(env.tracker.dashboard("bob").unwrap().status, Status::Stopped);
}

#[test]
fn test_state_survives_a_restart() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    env.tracker.apply("alice", Action::Start).unwrap();
    env.clock.set(utc(2024, 3, 4, 10, 0, 0));
    env.tracker.apply("alice", Action::BreakStart).unwrap();

    let gateway = SqliteGateway::open(&env.db_path, Settings::default(), "admin", Tz::UTC).unwrap();
    let clock = FixedClock::new(utc(2024, 3, 4, 10, 15, 0), Tz::UTC);
    let restarted = Tracker::new(Arc::new(gateway), Arc::new(clock));

    let report = restarted.apply("alice", Action::Stop).unwrap();
    let entry = report.entry.expect("entry");
    assert_eq!(entry.worked_duration, Duration::hours(1));
    assert_eq!(entry.break_duration, Duration::minutes(15));
}

#[test]
fn test_corrupt_state_document_falls_back_to_default() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));

    let conn = Connection::open(&env.db_path).unwrap();
    conn.execute(
        "INSERT INTO tracking_state (username, document, updated_at) VALUES ('alice', '{not json', 'x')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO tracking_state (username, document, updated_at)
         VALUES ('bob', '{\"status\":\"working\",\"start_time\":null,\"break_start_time\":null}', 'x')",
        [],
    )
    .unwrap();

    for user in ["alice", "bob"] {
        assert_eq!(env.tracker.dashboard(user).unwrap().status, Status::Stopped);
        assert!(env.tracker.apply(user, Action::Start).unwrap().applied);
    }
}

#[test]
fn test_settings_update_and_validation() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    assert_eq!(env.tracker.settings("alice").unwrap(), Settings::default());

    let updated = env
        .tracker
        .update_settings(
            "alice",
            &SettingsUpdate {
                expected_daily_hours: Some(6.0),
                dark_mode: Some(true),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.expected_daily_hours, 6.0);
    assert_eq!(updated.expected_weekly_hours, 40.0);
    assert!(updated.dark_mode);

    let err = env
        .tracker
        .update_settings(
            "alice",
            &SettingsUpdate {
                expected_weekly_hours: Some(-1.0),
                ..SettingsUpdate::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidSettings(_)));

    // the rejected update changed nothing
    assert_eq!(env.tracker.settings("alice").unwrap(), updated);
    assert!(env.tracker.dashboard("alice").unwrap().dark_mode);
}

#[test]
fn test_login() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    env.gateway.add_user("alice", "s3cret").unwrap();

    assert!(env.tracker.login("alice", "s3cret").is_ok());

    let wrong = env.tracker.login("alice", "nope").unwrap_err();
    let unknown = env.tracker.login("mallory", "s3cret").unwrap_err();
    assert!(matches!(wrong, AppError::AuthFailure));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[test]
fn test_add_user_rules() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    env.gateway.add_user("alice", "pw").unwrap();

    assert!(matches!(
        env.gateway.add_user("alice", "other"),
        Err(AppError::UserExists(_))
    ));
    assert!(matches!(
        env.gateway.add_user("bad name", "pw"),
        Err(AppError::InvalidUsername(_))
    ));
    assert!(matches!(
        env.gateway.add_user("bob", ""),
        Err(AppError::InvalidPassword(_))
    ));

    // the stored value is salted, never the password itself
    let conn = Connection::open(&env.db_path).unwrap();
    let stored: String = conn
        .query_row("SELECT password_hash FROM users WHERE username = 'alice'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert!(stored.starts_with("sha256$"));
    assert!(!stored.contains("pw$") && !stored.ends_with("$pw"));
}

#[test]
fn test_report_from_tracker() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    env.tracker.apply("alice", Action::Start).unwrap();
    env.clock.set(utc(2024, 3, 4, 11, 0, 0));
    env.tracker.apply("alice", Action::Stop).unwrap();

    let report = env.tracker.report("alice", Period::Daily).unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.total_worked, "2:00:00");
}

#[test]
fn test_legacy_entries_are_imported_once() {
    let (dir, db_path) = temp_db();
    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_time TEXT,
                end_time TEXT,
                break_start TEXT,
                break_end TEXT
            );
            INSERT INTO entries (start_time, end_time, break_start, break_end)
                VALUES ('2024-03-04T09:00:00.123456', '2024-03-04T17:00:00', '2024-03-04T12:00:00', '2024-03-04T12:30:00');
            INSERT INTO entries (start_time, end_time)
                VALUES ('2024-03-05T08:00:00', '2024-03-05T10:00:00');
            INSERT INTO entries (start_time) VALUES ('2024-03-06T09:00:00');",
        )
        .unwrap();
    }

    let gateway = SqliteGateway::open(&db_path, Settings::default(), "admin", Tz::UTC).unwrap();
    let history = gateway.load("admin").unwrap().history;

    assert_eq!(history.len(), 2);
    assert_eq!(format_hms(history[0].worked_duration), "7:30:00");
    assert_eq!(format_hms(history[0].break_duration), "0:30:00");
    assert_eq!(format_hms(history[1].worked_duration), "2:00:00");

    let backups = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".zip"))
        .count();
    assert_eq!(backups, 1);

    // reopening does not import twice
    drop(gateway);
    let again = SqliteGateway::open(&db_path, Settings::default(), "admin", Tz::UTC).unwrap();
    assert_eq!(again.load("admin").unwrap().history.len(), 2);
}

fn config_with_ttl(dir: &tempfile::TempDir, db_path: &str, ttl: i64) -> std::path::PathBuf {
    let path = dir.path().join("rtimetracker.conf");
    std::fs::write(
        &path,
        format!("database: {db_path}\ntimezone: UTC\nsession_ttl_hours: {ttl}\n"),
    )
    .unwrap();
    path
}

#[test]
fn test_config_rejects_out_of_range_session_ttl() {
    let (dir, db_path) = temp_db();

    for ttl in [0, -1, MAX_SESSION_TTL_HOURS + 1, 3_000_000_000_000] {
        let path = config_with_ttl(&dir, &db_path, ttl);
        match Config::load_from(&path) {
            Err(AppError::Config(msg)) => assert!(msg.contains("session_ttl_hours"), "{msg}"),
            other => panic!("ttl {ttl} accepted: {other:?}"),
        }
    }

    for ttl in [1, 12, MAX_SESSION_TTL_HOURS] {
        let path = config_with_ttl(&dir, &db_path, ttl);
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.session_ttl().unwrap(), Duration::hours(ttl));
    }
}

#[test]
fn test_build_state_refuses_huge_session_ttl() {
    let (_dir, db_path) = temp_db();
    let mut cfg = Config::default();
    cfg.database = db_path;
    cfg.session_ttl_hours = 3_000_000_000_000;

    assert!(matches!(server::build_state(&cfg), Err(AppError::Config(_))));

    cfg.session_ttl_hours = 24;
    assert!(server::build_state(&cfg).is_ok());
}

#[test]
fn test_unknown_user_and_wrong_password_both_fail() {
    let env = test_env(utc(2024, 3, 4, 9, 0, 0));
    env.gateway.add_user("alice", "secret").unwrap();

    assert!(env.gateway.verify("alice", "secret").unwrap());
    assert!(!env.gateway.verify("alice", "wrong").unwrap());
    assert!(!env.gateway.verify("nobody", "secret").unwrap());
    assert!(!env.gateway.verify("nobody", "").unwrap());
}

#[test]
fn test_fixed_clock_advance_keeps_whole_seconds() {
    let clock = FixedClock::new(utc(2024, 3, 4, 9, 0, 0), Tz::UTC);

    clock.advance(Duration::milliseconds(1_500));
    assert_eq!(clock.now(), utc(2024, 3, 4, 9, 0, 1));

    clock.advance(Duration::milliseconds(999));
    assert_eq!(clock.now(), utc(2024, 3, 4, 9, 0, 1));
}
