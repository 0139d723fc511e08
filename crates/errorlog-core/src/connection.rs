// crates/errorlog-core/src/connection.rs
// ============================================================================
// Module: Connection String Helpers
// Description: Resolution and parsing of error log connection strings.
// Purpose: Turn configuration settings into a database file location.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! Error log settings name their database indirectly. A settings mapping may
//! carry the connection string inline (`connectionString`), name an entry in
//! the registered connection strings (`connectionStringName`), or name an
//! application setting that holds it (`connectionStringAppKey`).
//! [`resolve_connection_string`] applies those rules in that order.
//!
//! Connection strings are `key=value` pairs separated by `;`. Keys compare
//! case-insensitively with whitespace ignored, so `Data Source`, `DataSource`
//! and `data source` are the same key. [`ConnectionStringParts`] parses them
//! and [`ConnectionStringParts::data_source_path`] resolves the database file,
//! substituting the `|DataDirectory|` placeholder.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use crate::interfaces::ErrorLogError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Settings key holding an inline connection string.
pub const CONNECTION_STRING_KEY: &str = "connectionString";
/// Settings key naming a registered connection string.
pub const CONNECTION_STRING_NAME_KEY: &str = "connectionStringName";
/// Settings key naming an application setting holding the connection string.
pub const CONNECTION_STRING_APP_KEY: &str = "connectionStringAppKey";
/// Settings key overriding the application name partition.
pub const APPLICATION_NAME_KEY: &str = "applicationName";
/// Placeholder replaced by the configured data directory.
pub const DATA_DIRECTORY_TOKEN: &str = "|DataDirectory|";
/// Normalized keys accepted for the database file.
const DATA_SOURCE_KEYS: [&str; 2] = ["datasource", "filename"];

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Named connection strings and application settings used during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSources {
    /// Registered connection strings by name.
    pub connection_strings: BTreeMap<String, String>,
    /// Application settings by key.
    pub app_settings: BTreeMap<String, String>,
    /// Directory substituted for [`DATA_DIRECTORY_TOKEN`].
    pub data_directory: Option<PathBuf>,
}

/// Resolves the connection string for an error log settings mapping.
///
/// Returns an empty string when the settings name no connection string.
///
/// # Errors
///
/// Returns [`ErrorLogError::Configuration`] when a named connection string
/// or application setting is referenced but not registered.
pub fn resolve_connection_string(
    settings: &BTreeMap<String, String>,
    sources: &ConnectionSources,
) -> Result<String, ErrorLogError> {
    if let Some(inline) = non_blank(settings, CONNECTION_STRING_KEY) {
        return Ok(inline.to_string());
    }
    if let Some(name) = non_blank(settings, CONNECTION_STRING_NAME_KEY) {
        return sources.connection_strings.get(name).map(|value| value.trim().to_string()).ok_or_else(
            || ErrorLogError::Configuration(format!("connection string {name:?} is not registered")),
        );
    }
    if let Some(key) = non_blank(settings, CONNECTION_STRING_APP_KEY) {
        return sources.app_settings.get(key).map(|value| value.trim().to_string()).ok_or_else(
            || ErrorLogError::Configuration(format!("application setting {key:?} is not registered")),
        );
    }
    Ok(String::new())
}

/// Returns the trimmed setting value when present and not blank.
pub fn non_blank<'a>(settings: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    settings.get(key).map(|value| value.trim()).filter(|value| !value.is_empty())
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parsed connection string.
///
/// # Invariants
/// - Keys are stored normalized: lowercase with whitespace removed.
/// - Later duplicates of a key replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStringParts {
    /// Normalized key to value.
    pairs: BTreeMap<String, String>,
}

impl ConnectionStringParts {
    /// Parses a connection string.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorLogError::InvalidArgument`] when a non-empty segment has
    /// no `=` or an empty key, or a quoted value is not terminated.
    pub fn parse(connection_string: &str) -> Result<Self, ErrorLogError> {
        let mut pairs = BTreeMap::new();
        for segment in split_segments(connection_string)? {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((key, value)) = segment.split_once('=') else {
                return Err(ErrorLogError::InvalidArgument(format!(
                    "connection string segment {segment:?} is missing '='"
                )));
            };
            let key = normalize_key(key);
            if key.is_empty() {
                return Err(ErrorLogError::InvalidArgument(
                    "connection string contains an empty key".to_string(),
                ));
            }
            pairs.insert(key, unquote(value.trim()).to_string());
        }
        Ok(Self {
            pairs,
        })
    }

    /// Returns the value for `key`, compared after normalization.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(&normalize_key(key)).map(String::as_str)
    }

    /// Returns the raw data source value.
    #[must_use]
    pub fn data_source(&self) -> Option<&str> {
        DATA_SOURCE_KEYS
            .iter()
            .find_map(|key| self.pairs.get(*key))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Resolves the database file path, substituting [`DATA_DIRECTORY_TOKEN`]
    /// with `data_directory` (or the current directory when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorLogError::InvalidArgument`] when no data source is set.
    pub fn data_source_path(&self, data_directory: Option<&Path>) -> Result<PathBuf, ErrorLogError> {
        let Some(source) = self.data_source() else {
            return Err(ErrorLogError::InvalidArgument(
                "connection string has no Data Source".to_string(),
            ));
        };
        let Some(rest) = strip_prefix_ignore_case(source, DATA_DIRECTORY_TOKEN) else {
            return Ok(PathBuf::from(source));
        };
        let rest = rest.trim_start_matches(['/', '\\']);
        let base = data_directory.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(if rest.is_empty() { base } else { base.join(rest) })
    }
}

/// Splits on `;` outside of quoted values. Quotes only open at the start of a value.
fn split_segments(input: &str) -> Result<Vec<&str>, ErrorLogError> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut seen_equals = false;
    let mut value_start = false;
    let mut start = 0;
    for (index, ch) in input.char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' if value_start => {
                quote = Some(ch);
                value_start = false;
            }
            ';' => {
                segments.push(&input[start .. index]);
                start = index + 1;
                seen_equals = false;
                value_start = false;
            }
            '=' if !seen_equals => {
                seen_equals = true;
                value_start = true;
            }
            _ if ch.is_whitespace() => {}
            _ => value_start = false,
        }
    }
    if quote.is_some() {
        return Err(ErrorLogError::InvalidArgument(
            "connection string has an unterminated quoted value".to_string(),
        ));
    }
    segments.push(&input[start ..]);
    Ok(segments)
}

/// Lowercases a key and removes whitespace.
fn normalize_key(key: &str) -> String {
    key.chars().filter(|ch| !ch.is_whitespace()).flat_map(char::to_lowercase).collect()
}

/// Removes one layer of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner;
        }
    }
    value
}

/// Strips an ASCII prefix, ignoring case.
fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(.. prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &value[prefix.len() ..])
}

// ============================================================================
// SECTION: Tests
// ============================================================================
