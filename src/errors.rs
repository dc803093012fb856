//! Unified application error type.
//! All modules (db, core, server, cli, utils) return AppError to keep the
//! error handling consistent. Nothing in here is fatal to the service: the
//! HTTP layer turns every variant into a response.

use crate::models::status::Status;
use std::io;
use thiserror::Error;

/// Why a session transition was refused.
///
/// A refused transition is a safe no-op: the state is left untouched and the
/// caller reports it to the user instead of failing the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: Status,
    },

    #[error("cannot {action}: no session has been started")]
    MissingState { action: &'static str },
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Persistence
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored state is unreadable: {0}")]
    PersistenceCorrupt(String),

    // ---------------------------
    // Parsing / validation
    // ---------------------------
    #[error("Invalid duration format: {0} (expected H:MM:SS)")]
    InvalidDuration(String),

    #[error("Invalid time zone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid period: {0} (expected daily, weekly or monthly)")]
    InvalidPeriod(String),

    #[error("Export format not supported: {0}")]
    InvalidExportFormat(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    // ---------------------------
    // Session logic
    // ---------------------------
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Clock skew: end {end} is before start {start}")]
    ClockSkew { start: String, end: String },

    // ---------------------------
    // Authentication
    // ---------------------------
    #[error("invalid username or password")]
    AuthFailure,

    #[error("login required")]
    Unauthenticated,

    #[error("User already exists: {0}")]
    UserExists(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// True for errors caused by the request itself rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidDuration(_)
                | AppError::InvalidTimezone(_)
                | AppError::InvalidPeriod(_)
                | AppError::InvalidExportFormat(_)
                | AppError::InvalidSettings(_)
                | AppError::InvalidUsername(_)
                | AppError::InvalidPassword(_)
                | AppError::UserExists(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
