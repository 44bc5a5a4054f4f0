//! `ledger.toml` settings.
//!
//! Every section and key is optional; missing values take the defaults
//! below. Command-line flags are applied on top with
//! [`LedgerConfig::apply_overrides`].
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection = "sqlite:ledger.db?mode=rwc"
//!
//! [logging]
//! level = "info"
//! file = "ledger.log"
//!
//! [defaults]
//! cash_balance = "0"
//! ```

use std::path::{Path, PathBuf};

use ledger_core::db::DbConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// File read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ledger.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub backend: String,
    pub connection: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection: "sqlite:ledger.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` takes precedence.
    pub level: String,
    /// Append log records to this file as well.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsSection {
    /// Cash balance used by `ledger balance` when `--cash` is omitted.
    pub cash_balance: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub defaults: DefaultsSection,
}

impl LedgerConfig {
    pub fn from_toml_str(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`; a missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Reads `path` when it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Replaces file values with the ones given on the command line.
    pub fn apply_overrides(
        &mut self,
        backend: Option<String>,
        connection: Option<String>,
        log_level: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(backend) = backend {
            self.database.backend = backend;
        }
        if let Some(connection) = connection {
            self.database.connection = connection;
        }
        if let Some(level) = log_level {
            self.logging.level = level;
        }
        self.validate()
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.backend, &self.database.connection)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.backend.trim().is_empty() {
            return Err(ConfigError::Invalid("database.backend is empty".to_string()));
        }
        if self.database.connection.trim().is_empty() {
            return Err(ConfigError::Invalid("database.connection is empty".to_string()));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level is empty".to_string()));
        }
        Ok(())
    }
}
