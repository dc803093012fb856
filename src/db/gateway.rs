//! Persistence and credential gateway.
//!
//! The core only talks to [`Gateway`]; `SqliteGateway` is the production
//! implementation. `save` writes the new state and the appended history
//! entry in one transaction.

use crate::db::credentials::{hash_password, is_valid_username, verify_password};
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::credential::Credential;
use crate::models::history_entry::HistoryEntry;
use crate::models::settings::Settings;
use crate::models::tracking_state::TrackingState;
use chrono::Utc;
use chrono_tz::Tz;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Compared against when the username is unknown; matches no password.
const UNKNOWN_USER_HASH: &str =
    "sha256$00000000000000000000000000000000$0000000000000000000000000000000000000000000000000000000000000000";

/// Everything the core knows about one user.
#[derive(Debug, Clone, Default)]
pub struct UserDocument {
    pub state: TrackingState,
    pub history: Vec<HistoryEntry>,
    pub settings: Settings,
}

pub trait Gateway: Send + Sync {
    fn load(&self, user: &str) -> AppResult<UserDocument>;

    fn load_state(&self, user: &str) -> AppResult<TrackingState>;

    fn load_settings(&self, user: &str) -> AppResult<Settings>;

    /// Persist `state` and, when given, append `appended` to the history,
    /// both or neither.
    fn save(&self, user: &str, state: &TrackingState, appended: Option<&HistoryEntry>) -> AppResult<()>;

    fn save_settings(&self, user: &str, settings: &Settings) -> AppResult<()>;

    /// Check a login. Unknown user and wrong password are indistinguishable.
    fn verify(&self, username: &str, password: &str) -> AppResult<bool>;

    fn add_user(&self, username: &str, password: &str) -> AppResult<()>;

    /// Best-effort audit trail; failures are logged, never returned.
    fn audit(&self, operation: &str, target: &str, message: &str);
}

pub struct SqliteGateway {
    pool: Mutex<DbPool>,
    defaults: Settings,
}

impl SqliteGateway {
    /// Open the database and run pending migrations.
    pub fn open(path: &str, defaults: Settings, legacy_user: &str, tz: Tz) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn, legacy_user, tz)?;
        Ok(Self {
            pool: Mutex::new(pool),
            defaults,
        })
    }

    fn pool(&self) -> MutexGuard<'_, DbPool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(pool: &DbPool, user: &str) -> AppResult<TrackingState> {
        let Some(doc) = queries::load_state_document(&pool.conn, user)? else {
            return Ok(TrackingState::default());
        };

        let parsed = serde_json::from_str::<TrackingState>(&doc)
            .map_err(|e| AppError::PersistenceCorrupt(e.to_string()))
            .and_then(|state| {
                if state.is_consistent() {
                    Ok(state)
                } else {
                    Err(AppError::PersistenceCorrupt(
                        "fields disagree with status".to_string(),
                    ))
                }
            });

        match parsed {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(user, error = %e, "tracking state reset to default");
                Ok(TrackingState::default())
            }
        }
    }

    fn read_settings(&self, pool: &DbPool, user: &str) -> AppResult<Settings> {
        Ok(queries::load_settings(&pool.conn, user)?.unwrap_or(self.defaults))
    }
}

impl Gateway for SqliteGateway {
    fn load(&self, user: &str) -> AppResult<UserDocument> {
        let pool = self.pool();
        Ok(UserDocument {
            state: Self::read_state(&pool, user)?,
            history: queries::load_history(&pool.conn, user)?,
            settings: self.read_settings(&pool, user)?,
        })
    }

    fn load_state(&self, user: &str) -> AppResult<TrackingState> {
        Self::read_state(&self.pool(), user)
    }

    fn load_settings(&self, user: &str) -> AppResult<Settings> {
        self.read_settings(&self.pool(), user)
    }

    fn save(&self, user: &str, state: &TrackingState, appended: Option<&HistoryEntry>) -> AppResult<()> {
        let mut pool = self.pool();
        let tx = pool.conn.transaction()?;

        queries::upsert_state(&tx, user, state)?;
        if let Some(entry) = appended {
            queries::insert_history(&tx, user, entry, "web")?;
        }

        tx.commit()?;
        Ok(())
    }

    fn save_settings(&self, user: &str, settings: &Settings) -> AppResult<()> {
        queries::upsert_settings(&self.pool().conn, user, settings)
    }

    fn verify(&self, username: &str, password: &str) -> AppResult<bool> {
        let found = queries::find_user(&self.pool().conn, username)?;
        match found {
            Some(cred) => Ok(verify_password(password, &cred.password_hash)),
            None => {
                // same digest work as a real check
                verify_password(password, UNKNOWN_USER_HASH);
                Ok(false)
            }
        }
    }

    fn add_user(&self, username: &str, password: &str) -> AppResult<()> {
        if !is_valid_username(username) {
            return Err(AppError::InvalidUsername(username.to_string()));
        }
        if password.is_empty() {
            return Err(AppError::InvalidPassword("must not be empty".to_string()));
        }

        let pool = self.pool();
        if queries::find_user(&pool.conn, username)?.is_some() {
            return Err(AppError::UserExists(username.to_string()));
        }

        queries::insert_user(
            &pool.conn,
            &Credential {
                username: username.to_string(),
                password_hash: hash_password(password),
                created_at: Utc::now().to_rfc3339(),
            },
        )
    }

    fn audit(&self, operation: &str, target: &str, message: &str) {
        if let Err(e) = ttlog(&self.pool().conn, operation, target, message) {
            warn!(operation, error = %e, "failed to write audit log");
        }
    }
}
