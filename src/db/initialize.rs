use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use chrono_tz::Tz;
use rusqlite::Connection;

/// Initialize the database.
/// Delegates all schema creation / upgrades to the migration engine.
pub fn init_db(conn: &Connection, legacy_user: &str, tz: Tz) -> AppResult<()> {
    run_pending_migrations(conn, legacy_user, tz)
}
