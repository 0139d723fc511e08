// crates/errorlog-core/src/core/timezone.rs
// ============================================================================
// Module: Error Log Timezones
// Description: Timezone normalization for stored error timestamps.
// Purpose: Store instants as UTC and present them in the local offset.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Stores persist error times in UTC and hand them back in the host's local
//! offset. The local offset is not always discoverable (the `time` crate
//! refuses to read it on some multi-threaded Unix processes); UTC is used in
//! that case, which changes the representation but never the instant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::UtcOffset;

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Returns the same instant expressed in UTC.
#[must_use]
pub fn to_utc(time: OffsetDateTime) -> OffsetDateTime {
    time.to_offset(UtcOffset::UTC)
}

/// Returns the same instant expressed in the local offset, falling back to UTC.
#[must_use]
pub fn to_local(time: OffsetDateTime) -> OffsetDateTime {
    let offset = UtcOffset::local_offset_at(time).unwrap_or(UtcOffset::UTC);
    time.to_offset(offset)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
