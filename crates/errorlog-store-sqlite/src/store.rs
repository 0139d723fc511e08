// crates/errorlog-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Error Log
// Description: ErrorLog backed by a local SQLite database file.
// Purpose: Persist captured errors and list them newest first in pages.
// Dependencies: errorlog-core, rusqlite, thiserror, time, tracing, uuid
// ============================================================================

//! ## Overview
//! This module implements [`ErrorLog`] on top of `SQLite`. Each logged error
//! becomes one row of the `ELMAH_Error` table: the summary fields are stored
//! as columns for listing, and the complete record is stored as an encoded
//! payload for single-record lookups.
//!
//! The database file and schema are created on first use. Creation is
//! serialized per database path within the process and double-checked, and
//! the file is only linked into place once its schema is complete, so a
//! concurrent reader never observes a half-initialized database.
//!
//! Every operation opens its own connection and drops it before returning.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::Mutex;
use std::time::Duration;

use errorlog_core::CodecError;
use errorlog_core::ConnectionSources;
use errorlog_core::ConnectionStringParts;
use errorlog_core::ErrorCodec;
use errorlog_core::ErrorId;
use errorlog_core::ErrorLog;
use errorlog_core::ErrorLogConfig;
use errorlog_core::ErrorLogEntry;
use errorlog_core::ErrorLogError;
use errorlog_core::ErrorRecord;
use errorlog_core::XmlErrorCodec;
use errorlog_core::connection::APPLICATION_NAME_KEY;
use errorlog_core::connection::non_blank;
use errorlog_core::resolve_connection_string;
use errorlog_core::timezone::to_local;
use errorlog_core::timezone::to_utc;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use thiserror::Error;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::debug;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed label identifying this backend.
pub const LOG_NAME: &str = "SQLite Error Log";
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum characters in the `Application` column.
pub const MAX_APPLICATION_CHARS: usize = 60;
/// Maximum characters in the `Host` column.
pub const MAX_HOST_CHARS: usize = 50;
/// Maximum characters in the `Type` column.
pub const MAX_TYPE_CHARS: usize = 100;
/// Maximum characters in the `Source` column.
pub const MAX_SOURCE_CHARS: usize = 60;
/// Maximum characters in the `Message` column.
pub const MAX_MESSAGE_CHARS: usize = 500;
/// Maximum characters in the `User` column.
pub const MAX_USER_CHARS: usize = 50;
/// Connection string key for the busy timeout.
const BUSY_TIMEOUT_KEY: &str = "Busy Timeout";
/// Connection string key for the journal mode.
const JOURNAL_MODE_KEY: &str = "Journal Mode";

/// Fixed-width UTC timestamp layout; lexical order equals time order.
const TIME_UTC_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");

/// Table and index definitions.
const SCHEMA_SQL: &str = "CREATE TABLE ELMAH_Error (
        ErrorId TEXT NOT NULL UNIQUE,
        Application TEXT NOT NULL CHECK (length(Application) <= 60),
        Host TEXT NOT NULL CHECK (length(Host) <= 50),
        Type TEXT NOT NULL CHECK (length(Type) <= 100),
        Source TEXT NOT NULL CHECK (length(Source) <= 60),
        Message TEXT NOT NULL CHECK (length(Message) <= 500),
        [User] TEXT NOT NULL CHECK (length([User]) <= 50),
        StatusCode INTEGER NOT NULL,
        TimeUtc TEXT NOT NULL,
        Sequence INTEGER PRIMARY KEY AUTOINCREMENT,
        AllXml TEXT NOT NULL
    );
    CREATE INDEX IX_Error_App_Time_Seq
        ON ELMAH_Error (Application ASC, TimeUtc DESC, Sequence DESC);";

/// Initialization locks keyed by absolute database path.
static INIT_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode applied when the database is created.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }

    /// Parses a connection string value.
    fn parse(value: &str) -> Result<Self, SqliteErrorLogError> {
        if value.eq_ignore_ascii_case("wal") {
            Ok(Self::Wal)
        } else if value.eq_ignore_ascii_case("delete") {
            Ok(Self::Delete)
        } else {
            Err(SqliteErrorLogError::Invalid(format!("unsupported journal mode: {value}")))
        }
    }
}

/// Connection settings derived from the connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConnectionOptions {
    /// Path to the `SQLite` database file.
    path: PathBuf,
    /// Busy timeout in milliseconds.
    busy_timeout_ms: u64,
    /// Journal mode for newly created databases.
    journal_mode: SqliteJournalMode,
}

impl ConnectionOptions {
    /// Parses a connection string into connection settings.
    fn parse(
        connection_string: &str,
        data_directory: Option<&Path>,
    ) -> Result<Self, SqliteErrorLogError> {
        let parts = ConnectionStringParts::parse(connection_string)?;
        let path = parts.data_source_path(data_directory)?;
        validate_store_path(&path)?;
        let busy_timeout_ms = match parts.get(BUSY_TIMEOUT_KEY) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                SqliteErrorLogError::Invalid(format!("busy timeout must be milliseconds: {raw}"))
            })?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };
        let journal_mode = match parts.get(JOURNAL_MODE_KEY) {
            Some(raw) => SqliteJournalMode::parse(raw.trim())?,
            None => SqliteJournalMode::default(),
        };
        Ok(Self {
            path,
            busy_timeout_ms,
            journal_mode,
        })
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` error log errors.
///
/// # Invariants
/// - Error messages avoid embedding stored payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteErrorLogError {
    /// Invalid caller input.
    #[error("sqlite error log invalid argument: {0}")]
    Invalid(String),
    /// A bounded text field exceeded its column width.
    #[error("sqlite error log field {field} exceeds {max_chars} characters (got {actual_chars})")]
    FieldTooLong {
        /// Column name.
        field: &'static str,
        /// Column width in characters.
        max_chars: usize,
        /// Supplied length in characters.
        actual_chars: usize,
    },
    /// A paging argument was negative.
    #[error("sqlite error log argument out of range: {name} = {value}")]
    OutOfRange {
        /// Argument name.
        name: &'static str,
        /// Rejected value.
        value: i64,
    },
    /// Configuration produced no usable connection string.
    #[error("sqlite error log configuration error: {0}")]
    Config(String),
    /// Database or schema creation failed.
    #[error("sqlite error log initialization failed: {0}")]
    Init(String),
    /// Store I/O error.
    #[error("sqlite error log io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite error log db error: {0}")]
    Db(String),
    /// Stored column data could not be interpreted.
    #[error("sqlite error log corruption: {0}")]
    Corrupt(String),
    /// Payload codec failure.
    #[error("sqlite error log codec error: {0}")]
    Codec(#[from] CodecError),
}

impl From<SqliteErrorLogError> for ErrorLogError {
    fn from(error: SqliteErrorLogError) -> Self {
        match error {
            SqliteErrorLogError::Invalid(message) => Self::InvalidArgument(message),
            SqliteErrorLogError::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => Self::InvalidArgument(format!(
                "{field} exceeds {max_chars} characters (got {actual_chars})"
            )),
            SqliteErrorLogError::OutOfRange {
                name,
                value,
            } => Self::OutOfRange {
                name,
                value,
            },
            SqliteErrorLogError::Config(message) => Self::Configuration(message),
            SqliteErrorLogError::Init(message) => Self::Initialization(message),
            SqliteErrorLogError::Io(message)
            | SqliteErrorLogError::Db(message)
            | SqliteErrorLogError::Corrupt(message) => Self::Store(message),
            SqliteErrorLogError::Codec(error) => error.into(),
        }
    }
}

impl From<ErrorLogError> for SqliteErrorLogError {
    fn from(error: ErrorLogError) -> Self {
        match error {
            ErrorLogError::InvalidArgument(message) => Self::Invalid(message),
            ErrorLogError::OutOfRange {
                name,
                value,
            } => Self::OutOfRange {
                name,
                value,
            },
            ErrorLogError::Configuration(message) => Self::Config(message),
            ErrorLogError::Initialization(message) => Self::Init(message),
            ErrorLogError::Store(message) => Self::Db(message),
            ErrorLogError::Codec(message) => Self::Codec(CodecError::Decode(message)),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed error log.
///
/// # Invariants
/// - The database file and schema exist once construction succeeds.
/// - No connection outlives the call that opened it.
/// - Reads and counts are scoped to `application_name`.
#[derive(Clone)]
pub struct SqliteErrorLog {
    /// Connection string as supplied.
    connection_string: String,
    /// Settings parsed from the connection string.
    options: ConnectionOptions,
    /// Application name partition.
    application_name: String,
    /// Payload codec for the `AllXml` column.
    codec: Arc<dyn ErrorCodec>,
}

impl fmt::Debug for SqliteErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteErrorLog")
            .field("connection_string", &self.connection_string)
            .field("path", &self.options.path)
            .field("application_name", &self.application_name)
            .finish_non_exhaustive()
    }
}

/// Summary columns of one stored row.
struct SummaryRow {
    /// `ErrorId` column.
    id: String,
    /// `Application` column.
    application: String,
    /// `Host` column.
    host: String,
    /// `Type` column.
    type_name: String,
    /// `Source` column.
    source: String,
    /// `Message` column.
    message: String,
    /// `User` column.
    user: String,
    /// `StatusCode` column.
    status_code: i32,
    /// `TimeUtc` column.
    time_utc: String,
}

impl SqliteErrorLog {
    /// Opens an error log for a connection string, creating the database file
    /// and schema when they do not exist yet.
    ///
    /// `|DataDirectory|` resolves against the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteErrorLogError::Invalid`] for an empty or malformed
    /// connection string and [`SqliteErrorLogError::Init`] when the database
    /// cannot be created.
    pub fn new(connection_string: &str) -> Result<Self, SqliteErrorLogError> {
        Self::open(connection_string, None)
    }

    /// Opens an error log from a settings mapping.
    ///
    /// The connection string is resolved from `settings` and `sources`; an
    /// `applicationName` entry, when present and not blank, replaces the
    /// default application name.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteErrorLogError::Config`] when no connection string
    /// resolves, plus any error of [`SqliteErrorLog::new`].
    pub fn from_settings(
        settings: &BTreeMap<String, String>,
        sources: &ConnectionSources,
    ) -> Result<Self, SqliteErrorLogError> {
        let connection_string = resolve_connection_string(settings, sources)?;
        if connection_string.is_empty() {
            return Err(SqliteErrorLogError::Config(
                "connection string is missing for the SQLite error log".to_string(),
            ));
        }
        let mut log = Self::open(&connection_string, sources.data_directory.as_deref())?;
        if let Some(name) = non_blank(settings, APPLICATION_NAME_KEY) {
            log.set_application(name)?;
        }
        Ok(log)
    }

    /// Opens an error log from a loaded configuration document.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`SqliteErrorLog::from_settings`].
    pub fn from_config(config: &ErrorLogConfig) -> Result<Self, SqliteErrorLogError> {
        Self::from_settings(&config.error_log, &config.sources())
    }

    /// Replaces the payload codec.
    #[must_use]
    pub fn with_codec(mut self, codec: impl ErrorCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Returns the connection string the log was created with.
    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Returns the resolved database file path.
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.options.path
    }

    /// Validates the connection string and initializes the database.
    fn open(
        connection_string: &str,
        data_directory: Option<&Path>,
    ) -> Result<Self, SqliteErrorLogError> {
        if connection_string.trim().is_empty() {
            return Err(SqliteErrorLogError::Invalid(
                "connection string must not be empty".to_string(),
            ));
        }
        let options = ConnectionOptions::parse(connection_string, data_directory)?;
        initialize_database(&options)?;
        Ok(Self {
            connection_string: connection_string.to_string(),
            options,
            application_name: String::new(),
            codec: Arc::new(XmlErrorCodec::new()),
        })
    }

    /// Validates and stores the application name partition.
    fn set_application(&mut self, name: &str) -> Result<(), SqliteErrorLogError> {
        check_length("Application", name, MAX_APPLICATION_CHARS)?;
        name.clone_into(&mut self.application_name);
        Ok(())
    }

    /// Opens a per-call connection to the existing database.
    fn open_connection(&self) -> Result<Connection, SqliteErrorLogError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(&self.options.path, flags)
            .map_err(|err| SqliteErrorLogError::Db(err.to_string()))?;
        connection
            .busy_timeout(Duration::from_millis(self.options.busy_timeout_ms))
            .map_err(|err| SqliteErrorLogError::Db(err.to_string()))?;
        Ok(connection)
    }

    /// Inserts one row and returns its identifier.
    fn insert_error(&self, error: &ErrorRecord) -> Result<ErrorId, SqliteErrorLogError> {
        check_length("Application", &self.application_name, MAX_APPLICATION_CHARS)?;
        check_length("Host", &error.host_name, MAX_HOST_CHARS)?;
        check_length("Type", &error.type_name, MAX_TYPE_CHARS)?;
        check_length("Source", &error.source, MAX_SOURCE_CHARS)?;
        check_length("Message", &error.message, MAX_MESSAGE_CHARS)?;
        check_length("User", &error.user, MAX_USER_CHARS)?;
        let time_utc = format_time_utc(error.time)?;
        let payload = self.codec.encode(error)?;
        let id = ErrorId::generate();

        let connection = self.open_connection()?;
        connection
            .execute(
                "INSERT INTO ELMAH_Error (ErrorId, Application, Host, Type, Source, Message, \
                 [User], StatusCode, TimeUtc, AllXml) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, \
                 ?9, ?10)",
                params![
                    id.to_canonical(),
                    self.application_name,
                    error.host_name,
                    error.type_name,
                    error.source,
                    error.message,
                    error.user,
                    error.status_code,
                    time_utc,
                    payload,
                ],
            )
            .map_err(|err| SqliteErrorLogError::Db(err.to_string()))?;
        debug!(error_id = %id, application = %self.application_name, "logged error");
        Ok(id)
    }

    /// Reads one page of summaries and the application's total row count.
    fn query_page(
        &self,
        page_index: i32,
        page_size: i32,
        entries: Option<&mut Vec<ErrorLogEntry>>,
    ) -> Result<u64, SqliteErrorLogError> {
        if page_index < 0 {
            return Err(SqliteErrorLogError::OutOfRange {
                name: "page_index",
                value: i64::from(page_index),
            });
        }
        if page_size < 0 {
            return Err(SqliteErrorLogError::OutOfRange {
                name: "page_size",
                value: i64::from(page_size),
            });
        }

        let connection = self.open_connection()?;
        if let Some(entries) = entries {
            let limit = i64::from(page_size);
            let offset = i64::from(page_index) * limit;
            let mut stmt = connection
                .prepare(
                    "SELECT ErrorId, Application, Host, Type, Source, Message, [User], \
                     StatusCode, TimeUtc FROM ELMAH_Error WHERE Application = ?1 ORDER BY \
                     TimeUtc DESC, Sequence DESC LIMIT ?2 OFFSET ?3",
                )
                .map_err(|err| SqliteErrorLogError::Db(err.to_string()))?;
            let rows = stmt
                .query_map(params![self.application_name, limit, offset], map_summary_row)
                .map_err(|err| SqliteErrorLogError::Db(err.to_string()))?;
            for row in rows {
                let row = row.map_err(|err| SqliteErrorLogError::Db(err.to_string()))?;
                entries.push(summary_entry(row)?);
            }
        }

        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM ELMAH_Error WHERE Application = ?1",
                params![self.application_name],
                |row| row.get(0),
            )
            .map_err(|err| SqliteErrorLogError::Db(err.to_string()))?;
        debug!(
            application = %self.application_name,
            page_index,
            page_size,
            total = count,
            "read error page"
        );
        u64::try_from(count)
            .map_err(|_| SqliteErrorLogError::Corrupt(format!("negative row count: {count}")))
    }

    /// Reads and decodes one full record.
    fn query_error(&self, id: &str) -> Result<Option<ErrorLogEntry>, SqliteErrorLogError> {
        let error_id = ErrorId::parse(id)?;
        let connection = self.open_connection()?;
        let payload: Option<String> = connection
            .query_row(
                "SELECT AllXml FROM ELMAH_Error WHERE ErrorId = ?1",
                params![error_id.to_canonical()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteErrorLogError::Db(err.to_string()))?;
        drop(connection);
        let Some(payload) = payload else {
            return Ok(None);
        };
        let mut record = self.codec.decode(&payload)?;
        record.time = to_local(record.time);
        Ok(Some(ErrorLogEntry::new(LOG_NAME, id, record)))
    }
}

impl ErrorLog for SqliteErrorLog {
    fn name(&self) -> &str {
        LOG_NAME
    }

    fn application_name(&self) -> &str {
        &self.application_name
    }

    fn set_application_name(&mut self, name: &str) -> Result<(), ErrorLogError> {
        self.set_application(name).map_err(ErrorLogError::from)
    }

    fn log(&self, error: &ErrorRecord) -> Result<String, ErrorLogError> {
        self.insert_error(error).map(|id| id.to_canonical()).map_err(ErrorLogError::from)
    }

    fn get_errors(
        &self,
        page_index: i32,
        page_size: i32,
        entries: Option<&mut Vec<ErrorLogEntry>>,
    ) -> Result<u64, ErrorLogError> {
        self.query_page(page_index, page_size, entries).map_err(ErrorLogError::from)
    }

    fn get_error(&self, id: &str) -> Result<Option<ErrorLogEntry>, ErrorLogError> {
        self.query_error(id).map_err(ErrorLogError::from)
    }
}

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Creates the database file and schema unless the file already exists.
fn initialize_database(options: &ConnectionOptions) -> Result<(), SqliteErrorLogError> {
    let path = &options.path;
    if path.exists() {
        debug!(path = %path.display(), "error log database already exists");
        return Ok(());
    }

    let lock = init_lock(path)?;
    let _guard =
        lock.lock().map_err(|_| SqliteErrorLogError::Init("init mutex poisoned".to_string()))?;
    if path.exists() {
        return Ok(());
    }

    create_database(options).inspect_err(|err| {
        warn!(path = %path.display(), error = %err, "error log database creation failed");
    })?;
    release_init_lock(path);
    info!(path = %path.display(), "created error log database");
    Ok(())
}

/// Returns the lock table key for a database path.
fn init_lock_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Returns the initialization lock for a database path.
fn init_lock(path: &Path) -> Result<Arc<Mutex<()>>, SqliteErrorLogError> {
    let mut locks = INIT_LOCKS
        .lock()
        .map_err(|_| SqliteErrorLogError::Init("init lock table poisoned".to_string()))?;
    Ok(Arc::clone(locks.entry(init_lock_key(path)).or_default()))
}

/// Drops the lock entry once the database exists; later openers take the
/// fast path and waiters holding the old lock re-check existence.
fn release_init_lock(path: &Path) {
    if let Ok(mut locks) = INIT_LOCKS.lock() {
        locks.remove(&init_lock_key(path));
    }
}

/// Builds the database under a staging name and links it into place.
fn create_database(options: &ConnectionOptions) -> Result<(), SqliteErrorLogError> {
    let path = &options.path;
    ensure_parent_dir(path)?;
    let staging = staging_path(path)?;
    let result = build_schema(&staging, options).and_then(|()| publish(&staging, path));
    if let Err(err) = fs::remove_file(&staging)
        && err.kind() != ErrorKind::NotFound
    {
        debug!(path = %staging.display(), error = %err, "staging database cleanup failed");
    }
    result
}

/// Creates the schema in a fresh database file.
fn build_schema(staging: &Path, options: &ConnectionOptions) -> Result<(), SqliteErrorLogError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
    let mut connection = Connection::open_with_flags(staging, flags)
        .map_err(|err| SqliteErrorLogError::Init(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", options.journal_mode.pragma_value()))
        .map_err(|err| SqliteErrorLogError::Init(err.to_string()))?;
    let tx = connection.transaction().map_err(|err| SqliteErrorLogError::Init(err.to_string()))?;
    tx.execute_batch(SCHEMA_SQL).map_err(|err| SqliteErrorLogError::Init(err.to_string()))?;
    tx.commit().map_err(|err| SqliteErrorLogError::Init(err.to_string()))?;
    connection.close().map_err(|(_, err)| SqliteErrorLogError::Init(err.to_string()))
}

/// Links the staged database to its final path without replacing an
/// existing file; falls back to [`publish_by_rename`] where hard links fail.
fn publish(staging: &Path, path: &Path) -> Result<(), SqliteErrorLogError> {
    match fs::hard_link(staging, path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "error log database created concurrently");
            Ok(())
        }
        Err(_) => publish_by_rename(staging, path),
    }
}

/// Renames the staged database into place unless a database already exists.
fn publish_by_rename(staging: &Path, path: &Path) -> Result<(), SqliteErrorLogError> {
    if path.exists() {
        debug!(path = %path.display(), "error log database created concurrently");
        return Ok(());
    }
    fs::rename(staging, path).map_err(|err| SqliteErrorLogError::Init(err.to_string()))
}

/// Returns a unique staging file name next to `path`.
fn staging_path(path: &Path) -> Result<PathBuf, SqliteErrorLogError> {
    let Some(file_name) = path.file_name() else {
        return Err(SqliteErrorLogError::Init("store path missing file name".to_string()));
    };
    let staged = format!(".{}.{}.init", file_name.to_string_lossy(), Uuid::new_v4().simple());
    Ok(path.with_file_name(staged))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteErrorLogError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteErrorLogError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|err| SqliteErrorLogError::Init(err.to_string()))
}

/// Rejects database paths that are empty, exceed length limits, or name a
/// directory.
fn validate_store_path(path: &Path) -> Result<(), SqliteErrorLogError> {
    let invalid = |reason: &str| {
        Err(SqliteErrorLogError::Invalid(format!("database path {}: {reason}", path.display())))
    };
    if path.as_os_str().is_empty() {
        return invalid("must not be empty");
    }
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return invalid("exceeds length limit");
    }
    if path.components().any(|part| part.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH) {
        return invalid("contains an overlong component");
    }
    if path.is_dir() {
        return invalid("names a directory, not a database file");
    }
    Ok(())
}

/// Rejects values longer than their column width.
fn check_length(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), SqliteErrorLogError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(SqliteErrorLogError::FieldTooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

/// Formats an instant for the `TimeUtc` column.
fn format_time_utc(time: OffsetDateTime) -> Result<String, SqliteErrorLogError> {
    to_utc(time)
        .format(TIME_UTC_FORMAT)
        .map_err(|err| SqliteErrorLogError::Invalid(format!("time cannot be stored: {err}")))
}

/// Parses a `TimeUtc` column value.
fn parse_time_utc(raw: &str) -> Result<OffsetDateTime, SqliteErrorLogError> {
    PrimitiveDateTime::parse(raw, TIME_UTC_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|err| SqliteErrorLogError::Corrupt(format!("invalid TimeUtc {raw:?}: {err}")))
}

/// Maps the summary projection of a row.
fn map_summary_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SummaryRow> {
    Ok(SummaryRow {
        id: row.get(0)?,
        application: row.get(1)?,
        host: row.get(2)?,
        type_name: row.get(3)?,
        source: row.get(4)?,
        message: row.get(5)?,
        user: row.get(6)?,
        status_code: row.get(7)?,
        time_utc: row.get(8)?,
    })
}

/// Builds a summary entry; detail fields stay empty.
fn summary_entry(row: SummaryRow) -> Result<ErrorLogEntry, SqliteErrorLogError> {
    let mut record = ErrorRecord::at(to_local(parse_time_utc(&row.time_utc)?));
    record.application_name = row.application;
    record.host_name = row.host;
    record.type_name = row.type_name;
    record.source = row.source;
    record.message = row.message;
    record.user = row.user;
    record.status_code = row.status_code;
    Ok(ErrorLogEntry::new(LOG_NAME, row.id, record))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
