//! Runtime configuration for ledger hosts.
//!
//! # Responsibility
//! - Collect log level, log directory and database location in one value.
//! - Read overrides from `HOTELFIN_*` environment variables.
//!
//! # Invariants
//! - A returned config always has a supported, normalized log level.
//! - Configured paths are absolute.
//! - `db_path = None` means an in-memory ledger.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_LOG_LEVEL: &str = "HOTELFIN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HOTELFIN_LOG_DIR";
pub const ENV_DB_PATH: &str = "HOTELFIN_DB_PATH";

/// Host configuration for the ledger core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    /// SQLite ledger file; in-memory when unset.
    pub db_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        config.db_path = read(ENV_DB_PATH).map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    /// Normalizes the level in place and checks path invariants.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.log_level = normalize_level(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?
            .to_string();
        ensure_absolute(ENV_LOG_DIR, self.log_dir.as_deref())?;
        ensure_absolute(ENV_DB_PATH, self.db_path.as_deref())?;
        Ok(())
    }
}

fn ensure_absolute(key: &'static str, path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(path) if !path.is_absolute() => Err(ConfigError::RelativePath {
            key,
            value: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativePath { key: &'static str, value: PathBuf },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativePath { key, value } => {
                write!(f, "{key} must be an absolute path, got `{}`", value.display())
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn reads_and_normalizes_overrides() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_LOG_LEVEL, " WARNING "),
            (ENV_LOG_DIR, "/var/log/hotelfin"),
            (ENV_DB_PATH, "/var/lib/hotelfin/ledger.sqlite3"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/hotelfin")));
        assert_eq!(
            config.db_path,
            Some(PathBuf::from("/var/lib/hotelfin/ledger.sqlite3"))
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config =
            CoreConfig::from_lookup(lookup(&[(ENV_LOG_DIR, "   ")])).expect("blank is unset");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn rejects_bad_level_and_relative_paths() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "loud")]))
            .expect_err("unsupported level");
        assert_eq!(err, ConfigError::InvalidLogLevel("loud".to_string()));

        let err = CoreConfig::from_lookup(lookup(&[(ENV_DB_PATH, "ledger.sqlite3")]))
            .expect_err("relative db path");
        assert_eq!(
            err,
            ConfigError::RelativePath {
                key: ENV_DB_PATH,
                value: PathBuf::from("ledger.sqlite3"),
            }
        );
    }
}
