// crates/errorlog-core/src/config.rs
// ============================================================================
// Module: Error Log Configuration
// Description: TOML configuration for error log backends.
// Purpose: Load error log settings and connection string sources from disk.
// Dependencies: crate::connection, serde, thiserror, toml, tracing
// ============================================================================

//! ## Overview
//! Hosts describe their error log in a TOML document:
//!
//! ```toml
//! data_directory = "/var/lib/app"
//!
//! [error_log]
//! connectionStringName = "errors"
//! applicationName = "App1"
//!
//! [connection_strings]
//! errors = "Data Source=|DataDirectory|/errors.db"
//! ```
//!
//! The `error_log` table is a free-form settings mapping handed to backends;
//! the remaining tables feed [`ConnectionSources`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::connection::APPLICATION_NAME_KEY;
use crate::connection::ConnectionSources;
use crate::connection::non_blank;
use crate::connection::resolve_connection_string;
use crate::interfaces::ErrorLogError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("config io error: {0}")]
    Io(String),
    /// The document is not valid TOML for this schema.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The document parsed but is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ErrorLogError {
    fn from(error: ConfigError) -> Self {
        Self::Configuration(error.to_string())
    }
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Error log configuration document.
///
/// # Invariants
/// - `error_log` is non-empty after [`ErrorLogConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorLogConfig {
    /// Directory substituted for `|DataDirectory|` in connection strings.
    #[serde(default)]
    pub data_directory: Option<PathBuf>,
    /// Settings mapping passed to the error log backend.
    #[serde(default)]
    pub error_log: BTreeMap<String, String>,
    /// Registered connection strings by name.
    #[serde(default)]
    pub connection_strings: BTreeMap<String, String>,
    /// Application settings by key.
    #[serde(default)]
    pub app_settings: BTreeMap<String, String>,
}

impl ErrorLogConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, is too large, is
    /// not UTF-8 TOML, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml(content)?;
        debug!(path = %path.display(), "loaded error log config");
        Ok(config)
    }

    /// Parses and validates a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is malformed or invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the `error_log` table is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.error_log.is_empty() {
            return Err(ConfigError::Invalid("error_log settings must not be empty".to_string()));
        }
        Ok(())
    }

    /// Returns the connection string sources described by this document.
    #[must_use]
    pub fn sources(&self) -> ConnectionSources {
        ConnectionSources {
            connection_strings: self.connection_strings.clone(),
            app_settings: self.app_settings.clone(),
            data_directory: self.data_directory.clone(),
        }
    }

    /// Resolves the backend connection string.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorLogError::Configuration`] when a referenced connection
    /// string is not registered.
    pub fn connection_string(&self) -> Result<String, ErrorLogError> {
        resolve_connection_string(&self.error_log, &self.sources())
    }

    /// Returns the application name override, when set and not blank.
    #[must_use]
    pub fn application_name(&self) -> Option<&str> {
        non_blank(&self.error_log, APPLICATION_NAME_KEY)
    }
}
