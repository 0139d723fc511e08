// crates/errorlog-core/src/lib.rs
// ============================================================================
// Module: Error Log Core Library
// Description: Public API surface for the error log core.
// Purpose: Expose records, the backend contract, the payload codec, and config.
// Dependencies: crate::{codec, config, connection, core, interfaces}
// ============================================================================

//! ## Overview
//! Error log core defines what a captured application error looks like and
//! the contract every backing store implements. It is backend-agnostic:
//! storage engines live in their own crates and depend on this one for the
//! record model, the [`ErrorLog`] trait, the pluggable payload codec, and
//! connection string resolution.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod codec;
pub mod config;
pub mod connection;
pub mod core;
pub mod interfaces;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use codec::CodecError;
pub use codec::ErrorCodec;
pub use codec::XmlErrorCodec;
pub use config::ConfigError;
pub use config::ErrorLogConfig;
pub use connection::ConnectionSources;
pub use connection::ConnectionStringParts;
pub use connection::resolve_connection_string;
pub use interfaces::ErrorLog;
pub use interfaces::ErrorLogError;
