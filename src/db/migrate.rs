//! Schema migrations.
//!
//! Each migration runs once; applied versions are recorded in the `log` table
//! with `operation = 'migration_applied'`. A database created by the legacy
//! single-table service (`entries`) is backed up and imported on first run.

use crate::core::backup::zip_file;
use crate::db::queries::insert_history;
use crate::errors::{AppError, AppResult};
use crate::models::history_entry::HistoryEntry;
use crate::utils::time::elapsed;
use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, TimeZone, Utc};
use chrono_tz::Tz;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{info, warn};

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_create_users",
        description: "Create users table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS users (
                username      TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                created_at    TEXT NOT NULL
            );
        "#,
    },
    Migration {
        version: "20250301_0002_create_tracking_state",
        description: "Create tracking_state table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS tracking_state (
                username   TEXT PRIMARY KEY,
                document   TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
    },
    Migration {
        version: "20250301_0003_create_history",
        description: "Create history table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS history (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                username       TEXT NOT NULL,
                start          TEXT NOT NULL,
                end            TEXT NOT NULL,
                worked_seconds INTEGER NOT NULL CHECK(worked_seconds >= 0),
                break_seconds  INTEGER NOT NULL CHECK(break_seconds >= 0),
                source         TEXT NOT NULL DEFAULT 'web',
                created_at     TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_user_start ON history(username, start);
        "#,
    },
    Migration {
        version: "20250301_0004_create_settings",
        description: "Create settings table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS settings (
                username              TEXT PRIMARY KEY,
                expected_daily_hours  REAL NOT NULL,
                expected_weekly_hours REAL NOT NULL,
                break_minutes         INTEGER NOT NULL,
                dark_mode             INTEGER NOT NULL DEFAULT 0
            );
        "#,
    },
];

/// Ensure that the `log` table exists; it also records applied migrations.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM log
             WHERE operation = 'migration_applied' AND target = ?1
             LIMIT 1",
            [version],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn table_exists(conn: &Connection, name: &str) -> AppResult<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        params![Utc::now().to_rfc3339(), m.version, m.description],
    )?;
    tx.commit()?;

    info!(version = m.version, "migration applied");
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by `db::initialize::init_db()`.
pub fn run_pending_migrations(conn: &Connection, legacy_user: &str, tz: Tz) -> AppResult<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            apply(conn, m)?;
        }
    }

    if table_exists(conn, "entries")? {
        warn!("legacy 'entries' table detected, importing into history");
        backup_before_import(conn)?;
        import_legacy_entries(conn, legacy_user, tz)?;
    }

    Ok(())
}

fn backup_before_import(conn: &Connection) -> AppResult<()> {
    let db_path: String = conn
        .query_row("PRAGMA database_list;", [], |row| row.get(2))
        .unwrap_or_default();

    if db_path.is_empty() {
        warn!("could not determine database path, backup before legacy import skipped");
        return Ok(());
    }

    let src = Path::new(&db_path);
    let backup_name = format!(
        "{}-backup_before_legacy_import.zip",
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    let dest = src.with_file_name(backup_name);

    zip_file(src, &dest, "database.sqlite")?;
    info!(backup = %dest.display(), "backup created before legacy import");
    Ok(())
}

/// Parse a legacy timestamp: RFC 3339, or a naive ISO datetime interpreted in `tz`.
fn parse_legacy_ts(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).trunc_subsecs(0));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(0))
}

type LegacyRow = (i64, Option<String>, Option<String>, Option<String>, Option<String>);

fn legacy_entry(row: &LegacyRow, tz: Tz) -> Option<HistoryEntry> {
    let (_, start, end, break_start, break_end) = row;
    let start = parse_legacy_ts(start.as_deref()?, tz)?;
    let end = parse_legacy_ts(end.as_deref()?, tz)?.max(start);

    let total = elapsed(start, end);
    let breaks = match (break_start.as_deref(), break_end.as_deref()) {
        (Some(bs), Some(be)) => match (parse_legacy_ts(bs, tz), parse_legacy_ts(be, tz)) {
            (Some(bs), Some(be)) => elapsed(bs, be).min(total),
            _ => Duration::zero(),
        },
        _ => Duration::zero(),
    };

    Some(HistoryEntry {
        start,
        end,
        worked_duration: total - breaks,
        break_duration: breaks,
    })
}

fn import_legacy_entries(conn: &Connection, user: &str, tz: Tz) -> AppResult<()> {
    let rows: Vec<LegacyRow> = {
        let mut stmt = conn.prepare(
            "SELECT id, start_time, end_time, break_start, break_end FROM entries ORDER BY id ASC",
        )?;
        let mapped =
            stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))?;

        let mut out = Vec::new();
        for r in mapped {
            out.push(r?);
        }
        out
    };

    let tx = conn.unchecked_transaction()?;
    let mut imported = 0usize;

    for row in &rows {
        match legacy_entry(row, tz) {
            Some(entry) => {
                insert_history(&tx, user, &entry, "legacy")?;
                imported += 1;
            }
            None => warn!(id = row.0, "legacy row skipped (open session or unreadable timestamps)"),
        }
    }

    tx.execute_batch("ALTER TABLE entries RENAME TO entries_legacy;")?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message) VALUES (?1, 'legacy_import', ?2, ?3)",
        params![
            Utc::now().to_rfc3339(),
            user,
            format!("Imported {} of {} legacy entries", imported, rows.len())
        ],
    )?;
    tx.commit()?;

    info!(imported, total = rows.len(), user, "legacy entries imported");
    Ok(())
}
