// crates/errorlog-core/src/core/mod.rs
// ============================================================================
// Module: Error Log Core Types
// Description: Records, identifiers, and time helpers.
// Purpose: Group the data model shared by every error log backend.
// Dependencies: crate::core::{identifiers, record, timezone}
// ============================================================================

//! ## Overview
//! Data model shared by error log backends.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identifiers;
pub mod record;
pub mod timezone;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::ErrorId;
pub use record::ErrorLogEntry;
pub use record::ErrorRecord;
pub use record::NameValue;
