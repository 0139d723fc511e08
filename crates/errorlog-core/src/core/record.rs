// crates/errorlog-core/src/core/record.rs
// ============================================================================
// Module: Error Log Records
// Description: In-memory representation of captured application errors.
// Purpose: Carry error details between the logging facility and its stores.
// Dependencies: time
// ============================================================================

//! ## Overview
//! An [`ErrorRecord`] is the full structured form of one captured error: the
//! summary fields a listing shows, the exception detail text, and the request
//! context collections. Stores return records wrapped in an [`ErrorLogEntry`]
//! that also names the log and the identifier the record was stored under.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

// ============================================================================
// SECTION: Name/Value Collections
// ============================================================================

/// One entry of an ordered request-context collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameValue {
    /// Entry name (server variable, query key, form field, cookie name).
    pub name: String,
    /// Entry value.
    pub value: String,
}

impl NameValue {
    /// Creates a new name/value pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Error Record
// ============================================================================

/// A captured application error.
///
/// # Invariants
/// - `time` is an absolute instant; equality compares instants, not offsets.
/// - Collections preserve caller insertion order and may repeat names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Application the error was raised in.
    pub application_name: String,
    /// Machine that raised the error.
    pub host_name: String,
    /// Error type name (for example the exception type).
    pub type_name: String,
    /// Component or assembly that raised the error.
    pub source: String,
    /// Short error message.
    pub message: String,
    /// Full error detail, typically a stack trace.
    pub detail: String,
    /// Identity of the user the request ran as.
    pub user: String,
    /// HTTP status code of the failed response.
    pub status_code: i32,
    /// Time the error was captured.
    pub time: OffsetDateTime,
    /// HTML error page produced by the web host, when any.
    pub web_host_html_message: String,
    /// Server variables of the failed request.
    pub server_variables: Vec<NameValue>,
    /// Query string entries of the failed request.
    pub query_string: Vec<NameValue>,
    /// Form entries of the failed request.
    pub form: Vec<NameValue>,
    /// Cookies of the failed request.
    pub cookies: Vec<NameValue>,
}

impl ErrorRecord {
    /// Creates an empty record captured at `time`.
    #[must_use]
    pub fn at(time: OffsetDateTime) -> Self {
        Self {
            application_name: String::new(),
            host_name: String::new(),
            type_name: String::new(),
            source: String::new(),
            message: String::new(),
            detail: String::new(),
            user: String::new(),
            status_code: 0,
            time,
            web_host_html_message: String::new(),
            server_variables: Vec::new(),
            query_string: Vec::new(),
            form: Vec::new(),
            cookies: Vec::new(),
        }
    }
}

impl Default for ErrorRecord {
    /// Creates an empty record stamped with the current UTC time.
    fn default() -> Self {
        Self::at(OffsetDateTime::now_utc())
    }
}

// ============================================================================
// SECTION: Log Entries
// ============================================================================

/// An error record as returned by an error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLogEntry {
    /// Name of the log that produced the entry.
    pub log_name: String,
    /// Identifier the record is stored under.
    pub id: String,
    /// The stored record (summary fields only for paged listings).
    pub error: ErrorRecord,
}

impl ErrorLogEntry {
    /// Creates a new log entry.
    #[must_use]
    pub fn new(log_name: impl Into<String>, id: impl Into<String>, error: ErrorRecord) -> Self {
        Self {
            log_name: log_name.into(),
            id: id.into(),
            error,
        }
    }
}
