//! Environment-driven store configuration.
//!
//! Variables:
//! - `BOOKSTORE_DB_PATH`: inventory database file.
//! - `BOOKSTORE_AUTHORITY`: content URI authority.
//! - `BOOKSTORE_LOG_LEVEL`: `trace|debug|info|warn|error`.
//! - `BOOKSTORE_LOG_DIR`: absolute log directory; logging stays off when unset.
//!
//! Blank or unparsable values fall back to defaults.

use crate::logging::{default_log_level, LogLevel};
use crate::provider::uri::DEFAULT_AUTHORITY;
use log::warn;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "BOOKSTORE_DB_PATH";
pub const ENV_AUTHORITY: &str = "BOOKSTORE_AUTHORITY";
pub const ENV_LOG_LEVEL: &str = "BOOKSTORE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BOOKSTORE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "bookstore.sqlite3";

/// Resolved runtime settings for opening the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub authority: String,
    pub log_level: LogLevel,
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            authority: DEFAULT_AUTHORITY.to_string(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to
    /// its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let log_level = match value(ENV_LOG_LEVEL) {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!("event=config_load module=config status=fallback key={ENV_LOG_LEVEL} error={err}");
                defaults.log_level
            }),
            None => defaults.log_level,
        };

        Self {
            db_path: value(ENV_DB_PATH).map_or(defaults.db_path, PathBuf::from),
            authority: value(ENV_AUTHORITY).unwrap_or(defaults.authority),
            log_level,
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}
