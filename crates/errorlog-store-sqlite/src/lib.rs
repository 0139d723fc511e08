// crates/errorlog-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Error Log
// Description: ErrorLog backend using a local SQLite database.
// Purpose: Provide embedded persistence for captured application errors.
// Dependencies: errorlog-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`ErrorLog`](errorlog_core::ErrorLog)
//! implementation. Errors are stored one row each, partitioned by application
//! name, and listed newest first with a stable tie-breaker. The database file
//! and schema are created on demand the first time a log is opened.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::LOG_NAME;
pub use store::MAX_APPLICATION_CHARS;
pub use store::MAX_HOST_CHARS;
pub use store::MAX_MESSAGE_CHARS;
pub use store::MAX_SOURCE_CHARS;
pub use store::MAX_TYPE_CHARS;
pub use store::MAX_USER_CHARS;
pub use store::SqliteErrorLog;
pub use store::SqliteErrorLogError;
pub use store::SqliteJournalMode;
