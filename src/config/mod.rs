use crate::errors::{AppError, AppResult};
use crate::models::settings::Settings;
use crate::ui::messages::success;
use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_listen")]
    pub listen: String,
    /// IANA zone used for "today", "this week" and for display.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: i64,
    /// Owner of rows imported from the legacy `entries` table.
    #[serde(default = "default_legacy_user")]
    pub legacy_user: String,
    /// Settings of users who never saved their own.
    #[serde(default)]
    pub defaults: Settings,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_session_ttl() -> i64 {
    12
}

/// Longest accepted login session, one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
fn default_legacy_user() -> String {
    "admin".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db_path: PathBuf) -> Self {
        Self {
            database: db_path.to_string_lossy().to_string(),
            listen: default_listen(),
            timezone: default_timezone(),
            log_format: LogFormat::default(),
            session_ttl_hours: default_session_ttl(),
            legacy_user: default_legacy_user(),
            defaults: Settings::default(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rtimetracker")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rtimetracker")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rtimetracker.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rtimetracker.sqlite")
    }

    /// Load configuration from the standard file, or defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        // fail early on a bad zone or TTL instead of at the first request
        cfg.tz()?;
        cfg.session_ttl()?;
        Ok(cfg)
    }

    /// Login session lifetime, `1..=MAX_SESSION_TTL_HOURS` hours.
    pub fn session_ttl(&self) -> AppResult<Duration> {
        let hours = self.session_ttl_hours;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
            return Err(AppError::Config(format!(
                "session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}"
            )));
        }
        Duration::try_hours(hours)
            .ok_or_else(|| AppError::Config(format!("session_ttl_hours out of range: {hours}")))
    }

    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::InvalidTimezone(self.timezone.clone()))
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        // keep user edits when re-initializing
        let mut config = Self::load().unwrap_or_default();
        config.database = db_path.to_string_lossy().to_string();

        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(|_| AppError::ConfigSave)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            success(format!("Config file: {}", Self::config_file().display()));
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(config)
    }
}
