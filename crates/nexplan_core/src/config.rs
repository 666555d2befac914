//! Host configuration for the project store.
//!
//! # Responsibility
//! - Describe where persisted state lives and how logging is set up.
//! - Load overrides from a JSON file and from `NEXPLAN_*` variables.
//!
//! # Invariants
//! - Missing file fields keep their defaults.
//! - A validated config has a non-empty storage key and a known log level.

use crate::logging::{default_log_level, normalize_level};
use crate::service::project_store::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE_NAME: &str = "nexplan.sqlite3";

const ENV_DB_PATH: &str = "NEXPLAN_DB_PATH";
const ENV_STORAGE_KEY: &str = "NEXPLAN_STORAGE_KEY";
const ENV_LOG_LEVEL: &str = "NEXPLAN_LOG_LEVEL";
const ENV_LOG_DIR: &str = "NEXPLAN_LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file holding persisted state.
    pub db_path: PathBuf,
    /// Key under which the whole project is stored.
    pub storage_key: String,
    pub log_level: String,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Applies `NEXPLAN_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_STORAGE_KEY) {
            self.storage_key = value;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key cannot be empty".to_string()));
        }
        normalize_level(&self.log_level).map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DEFAULT_DB_FILE_NAME};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nexplan.json");
        std::fs::write(&path, r#"{ "storage_key": "team_board" }"#).unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.storage_key, "team_board");
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn env_overrides_replace_fields() {
        let vars = HashMap::from([
            ("NEXPLAN_DB_PATH", "/tmp/board.sqlite3"),
            ("NEXPLAN_LOG_LEVEL", "warn"),
        ]);
        let mut config = StoreConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|value| value.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/board.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.storage_key, "nexplan_active_project");
    }

    #[test]
    fn validate_rejects_blank_key_and_unknown_level() {
        let blank_key = StoreConfig {
            storage_key: "  ".to_string(),
            ..StoreConfig::default()
        };
        assert!(matches!(blank_key.validate(), Err(ConfigError::Invalid(_))));

        let bad_level = StoreConfig {
            log_level: "chatty".to_string(),
            ..StoreConfig::default()
        };
        assert!(matches!(bad_level.validate(), Err(ConfigError::Invalid(_))));
        assert!(StoreConfig::default().validate().is_ok());
    }
}
