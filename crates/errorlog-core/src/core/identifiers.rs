// crates/errorlog-core/src/core/identifiers.rs
// ============================================================================
// Module: Error Log Identifiers
// Description: Canonical identifiers for logged error records.
// Purpose: Provide a strongly typed 128-bit identifier with a stable text form.
// Dependencies: uuid
// ============================================================================

//! ## Overview
//! Every logged error is addressed by an [`ErrorId`], a random 128-bit UUID.
//! The canonical text form is lowercase and hyphenated; parsing accepts any
//! form the `uuid` crate understands (braced, simple, URN) so that identifiers
//! copied from other tools still resolve.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::interfaces::ErrorLogError;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identifier assigned to an error record when it is logged.
///
/// # Invariants
/// - Never nil when produced by [`ErrorId::generate`].
/// - Display output is the canonical lowercase hyphenated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorId(Uuid);

impl ErrorId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parses an identifier supplied by a caller.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorLogError::InvalidArgument`] when `raw` is empty or is
    /// not a well-formed UUID.
    pub fn parse(raw: &str) -> Result<Self, ErrorLogError> {
        if raw.is_empty() {
            return Err(ErrorLogError::InvalidArgument("id must not be empty".to_string()));
        }
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|err| ErrorLogError::InvalidArgument(format!("id is not a valid uuid: {err}")))
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the canonical string form used for storage.
    #[must_use]
    pub fn to_canonical(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl FromStr for ErrorId {
    type Err = ErrorLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}
