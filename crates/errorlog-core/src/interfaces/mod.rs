// crates/errorlog-core/src/interfaces/mod.rs
// ============================================================================
// Module: Error Log Interfaces
// Description: Backend-agnostic contract for error log stores.
// Purpose: Define the plugin surface the logging facility depends on.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The logging facility talks to its backing store only through [`ErrorLog`].
//! Implementations persist records, list them newest first in pages, and look
//! them up by identifier. All methods are synchronous and may block on I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::ErrorLogEntry;
use crate::core::ErrorRecord;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error log failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - A missing record is not an error; lookups return `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorLogError {
    /// Caller input was empty, malformed, or exceeded a bound.
    #[error("error log invalid argument: {0}")]
    InvalidArgument(String),
    /// A numeric argument was outside its accepted range.
    #[error("error log argument out of range: {name} = {value}")]
    OutOfRange {
        /// Argument name.
        name: &'static str,
        /// Rejected value.
        value: i64,
    },
    /// Configuration resolved to an unusable value.
    #[error("error log configuration error: {0}")]
    Configuration(String),
    /// Database or schema creation failed; the log is unusable.
    #[error("error log initialization failed: {0}")]
    Initialization(String),
    /// Opening a connection or executing a statement failed.
    #[error("error log store failure: {0}")]
    Store(String),
    /// The error payload could not be encoded or decoded.
    #[error("error log payload codec failure: {0}")]
    Codec(String),
}

// ============================================================================
// SECTION: Error Log Contract
// ============================================================================

/// Backing store for captured application errors.
///
/// Every read is scoped to the log's application name.
pub trait ErrorLog {
    /// Returns the fixed label identifying this backend.
    fn name(&self) -> &str;

    /// Returns the application name partition used by reads and writes.
    fn application_name(&self) -> &str;

    /// Replaces the application name partition.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorLogError::InvalidArgument`] when the backend cannot
    /// store the name.
    fn set_application_name(&mut self, name: &str) -> Result<(), ErrorLogError>;

    /// Logs an error and returns the identifier it was stored under.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorLogError`] when the record is rejected or the write fails.
    fn log(&self, error: &ErrorRecord) -> Result<String, ErrorLogError>;

    /// Fetches one page of summary entries, newest first, and returns the
    /// total number of entries. Passing `None` for `entries` only counts.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorLogError::OutOfRange`] for negative paging arguments and
    /// [`ErrorLogError::Store`] when the read fails.
    fn get_errors(
        &self,
        page_index: i32,
        page_size: i32,
        entries: Option<&mut Vec<ErrorLogEntry>>,
    ) -> Result<u64, ErrorLogError>;

    /// Fetches one full entry by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorLogError::InvalidArgument`] for empty or malformed ids,
    /// [`ErrorLogError::Store`] when the read fails, and
    /// [`ErrorLogError::Codec`] when the stored payload cannot be decoded.
    fn get_error(&self, id: &str) -> Result<Option<ErrorLogEntry>, ErrorLogError>;
}
