//! Externally supplied runtime configuration.
//!
//! Only the store connection string and logging knobs are read here; values
//! come from the process environment (the CLI loads `.env` first).

use crate::logging::default_log_level;
use std::env;

pub const DATABASE_URL_ENV: &str = "BLOGSTORE_DATABASE_URL";
pub const LOG_LEVEL_ENV: &str = "BLOGSTORE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "BLOGSTORE_LOG_DIR";

/// Store connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `:memory:`, a file path, or a `sqlite://` prefixed path.
    pub database_url: String,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Reads `BLOGSTORE_DATABASE_URL`; an unset variable yields an empty url,
    /// which `Store::open` rejects.
    pub fn from_env() -> Self {
        Self::new(env::var(DATABASE_URL_ENV).unwrap_or_default())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Absolute directory for rolling log files. `None` leaves logging to the
    /// embedding binary.
    pub log_dir: Option<String>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        let level = env::var(LOG_LEVEL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = env::var(LOG_DIR_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        Self { level, log_dir }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}
