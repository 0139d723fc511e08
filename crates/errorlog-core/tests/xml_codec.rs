// crates/errorlog-core/tests/xml_codec.rs
// ============================================================================
// Module: XML Codec Tests
// Description: Validate the default error payload codec.
// Purpose: Ensure records survive encoding with escaping and collections intact.
// Dependencies: errorlog-core, proptest, time
// ============================================================================

//! ## Overview
//! Tests for [`XmlErrorCodec`]: document shape, escaping of markup in field
//! values, collection ordering, and rejection of malformed payloads.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use errorlog_core::CodecError;
use errorlog_core::ErrorCodec;
use errorlog_core::ErrorLogError;
use errorlog_core::ErrorRecord;
use errorlog_core::NameValue;
use errorlog_core::XmlErrorCodec;
use proptest::prelude::*;
use time::UtcOffset;
use time::macros::datetime;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn detailed_error() -> ErrorRecord {
    let mut error = ErrorRecord::at(datetime!(2011-01-12 21:09:24.5 -05:00));
    error.application_name = "/LM/W3SVC/1/ROOT".to_string();
    error.host_name = "web01".to_string();
    error.type_name = "System.Web.HttpException".to_string();
    error.source = "System.Web".to_string();
    error.message = "File does not exist.".to_string();
    error.detail = "System.Web.HttpException: File does not exist.\n   at Handler()".to_string();
    error.user = "DOMAIN\\alice".to_string();
    error.status_code = 404;
    error.server_variables = vec![
        NameValue::new("HTTP_HOST", "example.com"),
        NameValue::new("ALL_RAW", "Accept: */*"),
    ];
    error.query_string = vec![NameValue::new("id", "1"), NameValue::new("id", "2")];
    error.cookies = vec![NameValue::new("ASP.NET_SessionId", "xyz")];
    error
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

#[test]
fn xml_codec_writes_error_document() {
    let xml = XmlErrorCodec.encode(&detailed_error()).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(xml.contains("<error "));
    assert!(xml.contains("statusCode=\"404\""));
    assert!(xml.contains("time=\"2011-01-12T21:09:24.5-05:00\""));
    assert!(xml.contains("<serverVariables><item name=\"HTTP_HOST\"><value string=\"example.com\"/>"));
    assert!(!xml.contains("<form>"));
}

#[test]
fn xml_codec_omits_empty_attributes() {
    let xml = XmlErrorCodec.encode(&ErrorRecord::at(datetime!(2024-01-01 00:00 UTC))).unwrap();
    assert!(!xml.contains("host="));
    assert!(!xml.contains("webHostHtmlMessage="));
    assert!(xml.contains("<error "));
    assert!(xml.ends_with("/>"));
}

#[test]
fn xml_codec_escapes_markup_in_values() {
    let mut error = detailed_error();
    error.message = "<script>alert('x') & \"y\"</script>".to_string();
    let xml = XmlErrorCodec.encode(&error).unwrap();
    assert!(!xml.contains("<script>"));
    assert_eq!(XmlErrorCodec.decode(&xml).unwrap().message, error.message);
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

#[test]
fn xml_codec_decodes_what_it_encodes() {
    let error = detailed_error();
    let decoded = XmlErrorCodec.decode(&XmlErrorCodec.encode(&error).unwrap()).unwrap();
    assert_eq!(decoded, error);
    assert_eq!(decoded.time.offset(), error.time.offset());
}

#[test]
fn xml_codec_writes_sub_minute_offsets_as_utc() {
    let offset = UtcOffset::from_hms(0, 19, 32).unwrap();
    let error = ErrorRecord::at(datetime!(2024-01-01 00:00 UTC).to_offset(offset));
    let xml = XmlErrorCodec.encode(&error).unwrap();
    assert!(xml.contains("time=\"2024-01-01T00:00:00Z\""));

    let decoded = XmlErrorCodec.decode(&xml).unwrap();
    assert_eq!(decoded, error);
    assert_eq!(decoded.time.offset(), UtcOffset::UTC);
}

#[test]
fn xml_codec_decodes_foreign_documents() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
        <error host="WEB02" type="System.Exception" message="Boom" source="App"
               user="" time="2009-05-01T10:00:00.0000000Z" statusCode="0" extra="ignored">
          <serverVariables>
            <item name="REMOTE_ADDR">
              <value string="127.0.0.1" />
            </item>
          </serverVariables>
          <unknown><item name="skip"><value string="skip" /></item></unknown>
        </error>"#;
    let error = XmlErrorCodec.decode(xml).unwrap();
    assert_eq!(error.host_name, "WEB02");
    assert_eq!(error.message, "Boom");
    assert_eq!(error.time, datetime!(2009-05-01 10:00 UTC));
    assert_eq!(error.server_variables, vec![NameValue::new("REMOTE_ADDR", "127.0.0.1")]);
    assert!(error.query_string.is_empty());
}

#[test]
fn xml_codec_rejects_malformed_payloads() {
    for payload in ["", "not xml", "<error time=\"yesterday\" />", "<error time='2024-01-01T00:00:00Z'"] {
        let err = XmlErrorCodec.decode(payload).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)), "{payload:?}: {err:?}");
    }
}

#[test]
fn xml_codec_errors_map_to_codec_failures() {
    let mapped: ErrorLogError = CodecError::Decode("bad".to_string()).into();
    assert!(matches!(mapped, ErrorLogError::Codec(message) if message.contains("bad")));
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn xml_codec_preserves_arbitrary_text(
        message in "[ -~\t\n\u{a0}-\u{2fff}]{0,80}",
        name in "[a-zA-Z_][a-zA-Z0-9_]{0,16}",
        value in "[ -~]{0,40}",
    ) {
        let mut error = ErrorRecord::at(datetime!(2024-02-29 12:00 UTC));
        error.message = message;
        error.form.push(NameValue::new(name, value));
        let decoded = XmlErrorCodec.decode(&XmlErrorCodec.encode(&error).unwrap()).unwrap();
        prop_assert_eq!(decoded, error);
    }
}
