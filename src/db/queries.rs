use crate::errors::{AppError, AppResult};
use crate::models::credential::Credential;
use crate::models::history_entry::HistoryEntry;
use crate::models::settings::Settings;
use crate::models::tracking_state::TrackingState;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::warn;

// ---------------------------
// tracking_state
// ---------------------------

/// Raw JSON document of a user's live state, if any was ever saved.
pub fn load_state_document(conn: &Connection, user: &str) -> AppResult<Option<String>> {
    let doc = conn
        .query_row(
            "SELECT document FROM tracking_state WHERE username = ?1",
            [user],
            |row| row.get(0),
        )
        .optional()?;
    Ok(doc)
}

pub fn upsert_state(conn: &Connection, user: &str, state: &TrackingState) -> AppResult<()> {
    let document = serde_json::to_string(state)?;
    conn.execute(
        r#"
        INSERT INTO tracking_state (username, document, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(username) DO UPDATE SET
            document = excluded.document,
            updated_at = excluded.updated_at
        "#,
        params![user, document, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

// ---------------------------
// history
// ---------------------------

pub fn insert_history(conn: &Connection, user: &str, entry: &HistoryEntry, source: &str) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO history (username, start, end, worked_seconds, break_seconds, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    stmt.execute(params![
        user,
        entry.start.to_rfc3339(),
        entry.end.to_rfc3339(),
        entry.worked_seconds(),
        entry.break_seconds(),
        source,
        Utc::now().to_rfc3339(),
    ])?;
    Ok(())
}

fn parse_ts(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::PersistenceCorrupt(format!("bad timestamp '{raw}'")))
}

fn map_history(id: i64, start: &str, end: &str, worked: i64, brk: i64) -> AppResult<HistoryEntry> {
    let start = parse_ts(start)?;
    let end = parse_ts(end)?;
    if worked < 0 || brk < 0 || end < start {
        return Err(AppError::PersistenceCorrupt(format!(
            "history row {id} has inconsistent durations"
        )));
    }

    Ok(HistoryEntry {
        start,
        end,
        worked_duration: Duration::seconds(worked),
        break_duration: Duration::seconds(brk),
    })
}

type HistoryRow = (i64, String, String, i64, i64);

fn read_history_row(row: &Row) -> rusqlite::Result<HistoryRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

/// All completed sessions of a user, oldest first. Unreadable rows are
/// logged and skipped instead of failing the whole load.
pub fn load_history(conn: &Connection, user: &str) -> AppResult<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, start, end, worked_seconds, break_seconds
         FROM history
         WHERE username = ?1
         ORDER BY start ASC, id ASC",
    )?;

    let rows = stmt.query_map([user], read_history_row)?;

    let mut out = Vec::new();
    for r in rows {
        let (id, start, end, worked, brk) = r?;
        match map_history(id, &start, &end, worked, brk) {
            Ok(entry) => out.push(entry),
            Err(e) => warn!(user, id, error = %e, "skipping unreadable history row"),
        }
    }
    Ok(out)
}

pub fn count_history(conn: &Connection, user: &str) -> AppResult<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM history WHERE username = ?1",
        [user],
        |row| row.get(0),
    )?;
    Ok(n)
}

// ---------------------------
// settings
// ---------------------------

pub fn load_settings(conn: &Connection, user: &str) -> AppResult<Option<Settings>> {
    let settings = conn
        .query_row(
            "SELECT expected_daily_hours, expected_weekly_hours, break_minutes, dark_mode
             FROM settings WHERE username = ?1",
            [user],
            |row| {
                Ok(Settings {
                    expected_daily_hours: row.get(0)?,
                    expected_weekly_hours: row.get(1)?,
                    break_minutes: row.get(2)?,
                    dark_mode: row.get::<_, i64>(3)? == 1,
                })
            },
        )
        .optional()?;
    Ok(settings)
}

pub fn upsert_settings(conn: &Connection, user: &str, s: &Settings) -> AppResult<()> {
    conn.execute(
        r#"
        INSERT INTO settings (username, expected_daily_hours, expected_weekly_hours, break_minutes, dark_mode)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(username) DO UPDATE SET
            expected_daily_hours = excluded.expected_daily_hours,
            expected_weekly_hours = excluded.expected_weekly_hours,
            break_minutes = excluded.break_minutes,
            dark_mode = excluded.dark_mode
        "#,
        params![
            user,
            s.expected_daily_hours,
            s.expected_weekly_hours,
            s.break_minutes,
            if s.dark_mode { 1 } else { 0 },
        ],
    )?;
    Ok(())
}

// ---------------------------
// users
// ---------------------------

pub fn find_user(conn: &Connection, username: &str) -> AppResult<Option<Credential>> {
    let user = conn
        .query_row(
            "SELECT username, password_hash, created_at FROM users WHERE username = ?1",
            [username],
            |row| {
                Ok(Credential {
                    username: row.get(0)?,
                    password_hash: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn insert_user(conn: &Connection, cred: &Credential) -> AppResult<()> {
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![cred.username, cred.password_hash, cred.created_at],
    )?;
    Ok(())
}
