// crates/errorlog-core/src/codec.rs
// ============================================================================
// Module: Error Payload Codec
// Description: Serialization of full error records to and from text payloads.
// Purpose: Keep the stored payload format pluggable behind a narrow trait.
// Dependencies: quick-xml, thiserror, time
// ============================================================================

//! ## Overview
//! Stores keep the complete error record in a single text column and decode it
//! on single-record lookups. [`ErrorCodec`] is the seam; [`XmlErrorCodec`] is
//! the default implementation and writes the classic error-log XML document:
//!
//! ```xml
//! <error host="web01" type="System.Exception" time="2024-01-01T00:00:00Z" statusCode="500">
//!   <serverVariables><item name="PATH"><value string="/" /></item></serverVariables>
//! </error>
//! ```
//!
//! Empty attributes and empty collections are omitted on write and default to
//! empty values on read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::ErrorRecord;
use crate::core::NameValue;
use crate::core::timezone::to_utc;
use crate::interfaces::ErrorLogError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Root element name.
const ERROR_ELEMENT: &str = "error";
/// Collection item element name.
const ITEM_ELEMENT: &str = "item";
/// Collection value element name.
const VALUE_ELEMENT: &str = "value";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Payload codec failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The record could not be serialized.
    #[error("error payload encode failed: {0}")]
    Encode(String),
    /// The payload could not be parsed back into a record.
    #[error("error payload decode failed: {0}")]
    Decode(String),
}

impl From<CodecError> for ErrorLogError {
    fn from(error: CodecError) -> Self {
        Self::Codec(error.to_string())
    }
}

// ============================================================================
// SECTION: Codec Contract
// ============================================================================

/// Converts error records to and from their stored text payload.
pub trait ErrorCodec: Send + Sync {
    /// Serializes a record.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when the record cannot be represented.
    fn encode(&self, error: &ErrorRecord) -> Result<String, CodecError>;

    /// Parses a stored payload.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] when the payload is malformed.
    fn decode(&self, payload: &str) -> Result<ErrorRecord, CodecError>;
}

// ============================================================================
// SECTION: XML Codec
// ============================================================================

/// Request-context collections in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    /// `<serverVariables>`.
    ServerVariables,
    /// `<queryString>`.
    QueryString,
    /// `<form>`.
    Form,
    /// `<cookies>`.
    Cookies,
}

impl Collection {
    /// All collections in the order they are written.
    const ALL: [Self; 4] = [Self::ServerVariables, Self::QueryString, Self::Form, Self::Cookies];

    /// Returns the element name.
    const fn element(self) -> &'static str {
        match self {
            Self::ServerVariables => "serverVariables",
            Self::QueryString => "queryString",
            Self::Form => "form",
            Self::Cookies => "cookies",
        }
    }

    /// Maps an element name to a collection.
    fn from_element(name: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|collection| collection.element().as_bytes() == name)
    }

    /// Returns the record's entries for this collection.
    fn entries(self, error: &ErrorRecord) -> &[NameValue] {
        match self {
            Self::ServerVariables => &error.server_variables,
            Self::QueryString => &error.query_string,
            Self::Form => &error.form,
            Self::Cookies => &error.cookies,
        }
    }

    /// Returns the record's entries for this collection, mutably.
    fn entries_mut(self, error: &mut ErrorRecord) -> &mut Vec<NameValue> {
        match self {
            Self::ServerVariables => &mut error.server_variables,
            Self::QueryString => &mut error.query_string,
            Self::Form => &mut error.form,
            Self::Cookies => &mut error.cookies,
        }
    }
}

/// XML payload codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlErrorCodec;

impl XmlErrorCodec {
    /// Creates the codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ErrorCodec for XmlErrorCodec {
    fn encode(&self, error: &ErrorRecord) -> Result<String, CodecError> {
        // RFC 3339 offsets carry no seconds; such instants are written in UTC.
        let time = if error.time.offset().seconds_past_minute() == 0 {
            error.time
        } else {
            to_utc(error.time)
        };
        let time = time.format(&Rfc3339).map_err(encode_failure)?;
        let status_code = error.status_code.to_string();

        let mut root = BytesStart::new(ERROR_ELEMENT);
        push_text_attribute(&mut root, "application", &error.application_name);
        push_text_attribute(&mut root, "host", &error.host_name);
        push_text_attribute(&mut root, "type", &error.type_name);
        push_text_attribute(&mut root, "message", &error.message);
        push_text_attribute(&mut root, "source", &error.source);
        push_text_attribute(&mut root, "detail", &error.detail);
        push_text_attribute(&mut root, "user", &error.user);
        root.push_attribute(("time", time.as_str()));
        root.push_attribute(("statusCode", status_code.as_str()));
        push_text_attribute(&mut root, "webHostHtmlMessage", &error.web_host_html_message);

        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(encode_failure)?;
        let has_collections =
            Collection::ALL.iter().any(|collection| !collection.entries(error).is_empty());
        if has_collections {
            writer.write_event(Event::Start(root)).map_err(encode_failure)?;
            for collection in Collection::ALL {
                write_collection(&mut writer, collection.element(), collection.entries(error))?;
            }
            writer.write_event(Event::End(BytesEnd::new(ERROR_ELEMENT))).map_err(encode_failure)?;
        } else {
            writer.write_event(Event::Empty(root)).map_err(encode_failure)?;
        }
        String::from_utf8(writer.into_inner()).map_err(encode_failure)
    }

    fn decode(&self, payload: &str) -> Result<ErrorRecord, CodecError> {
        let mut reader = Reader::from_str(payload);
        let mut state = DecodeState::default();
        loop {
            match reader.read_event().map_err(decode_failure)? {
                Event::Start(element) => state.open(&element)?,
                Event::Empty(element) => {
                    state.open(&element)?;
                    state.close(element.name().as_ref());
                }
                Event::End(element) => state.close(element.name().as_ref()),
                Event::Eof => break,
                _ => {}
            }
        }
        state.record.ok_or_else(|| CodecError::Decode("missing <error> element".to_string()))
    }
}

// ============================================================================
// SECTION: Encoding Helpers
// ============================================================================

/// Adds an attribute unless the value is empty.
fn push_text_attribute(element: &mut BytesStart<'_>, name: &str, value: &str) {
    if !value.is_empty() {
        element.push_attribute((name, value));
    }
}

/// Writes one collection element; empty collections are skipped.
fn write_collection(
    writer: &mut Writer<Vec<u8>>,
    element: &str,
    entries: &[NameValue],
) -> Result<(), CodecError> {
    if entries.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(element))).map_err(encode_failure)?;
    for entry in entries {
        let mut item = BytesStart::new(ITEM_ELEMENT);
        item.push_attribute(("name", entry.name.as_str()));
        writer.write_event(Event::Start(item)).map_err(encode_failure)?;
        let mut value = BytesStart::new(VALUE_ELEMENT);
        value.push_attribute(("string", entry.value.as_str()));
        writer.write_event(Event::Empty(value)).map_err(encode_failure)?;
        writer.write_event(Event::End(BytesEnd::new(ITEM_ELEMENT))).map_err(encode_failure)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element))).map_err(encode_failure)?;
    Ok(())
}

/// Wraps an encoder failure.
fn encode_failure(err: impl fmt::Display) -> CodecError {
    CodecError::Encode(err.to_string())
}

/// Wraps a decoder failure.
fn decode_failure(err: impl fmt::Display) -> CodecError {
    CodecError::Decode(err.to_string())
}

// ============================================================================
// SECTION: Decoding State
// ============================================================================

/// Incremental decoder state across reader events.
#[derive(Debug, Default)]
struct DecodeState {
    /// Record built from the root element.
    record: Option<ErrorRecord>,
    /// Collection currently open.
    collection: Option<Collection>,
    /// Name of the open item and whether a value has been read for it.
    item: Option<(String, bool)>,
}

impl DecodeState {
    /// Handles an opening (or self-closing) element.
    fn open(&mut self, element: &BytesStart<'_>) -> Result<(), CodecError> {
        let name = element.name();
        let name = name.as_ref();
        if name == ERROR_ELEMENT.as_bytes() {
            if self.record.is_some() {
                return Err(CodecError::Decode("multiple <error> elements".to_string()));
            }
            self.record = Some(read_error_attributes(element)?);
            return Ok(());
        }
        if self.record.is_none() {
            return Ok(());
        }
        if let Some(collection) = Collection::from_element(name) {
            self.collection = Some(collection);
        } else if name == ITEM_ELEMENT.as_bytes() && self.collection.is_some() {
            let item_name = read_attribute(element, b"name")?.unwrap_or_default();
            self.item = Some((item_name, false));
        } else if name == VALUE_ELEMENT.as_bytes() {
            let value = read_attribute(element, b"string")?.unwrap_or_default();
            self.push_value(value);
        }
        Ok(())
    }

    /// Handles a closing element.
    fn close(&mut self, name: &[u8]) {
        if name == ITEM_ELEMENT.as_bytes() {
            if let Some((item_name, false)) = self.item.take() {
                self.push_entry(NameValue::new(item_name, String::new()));
            }
        } else if Collection::from_element(name).is_some() {
            self.collection = None;
            self.item = None;
        }
    }

    /// Records a value for the open item.
    fn push_value(&mut self, value: String) {
        let Some((item_name, seen)) = self.item.as_mut() else {
            return;
        };
        *seen = true;
        let entry = NameValue::new(item_name.clone(), value);
        self.push_entry(entry);
    }

    /// Appends an entry to the open collection.
    fn push_entry(&mut self, entry: NameValue) {
        if let (Some(collection), Some(record)) = (self.collection, self.record.as_mut()) {
            collection.entries_mut(record).push(entry);
        }
    }
}

/// Reads the root element's attributes into a record.
fn read_error_attributes(element: &BytesStart<'_>) -> Result<ErrorRecord, CodecError> {
    let mut record = ErrorRecord::at(OffsetDateTime::UNIX_EPOCH);
    let mut time_seen = false;
    for attribute in element.attributes() {
        let attribute = attribute.map_err(decode_failure)?;
        let value = attribute.unescape_value().map_err(decode_failure)?.into_owned();
        match attribute.key.as_ref() {
            b"application" => record.application_name = value,
            b"host" => record.host_name = value,
            b"type" => record.type_name = value,
            b"message" => record.message = value,
            b"source" => record.source = value,
            b"detail" => record.detail = value,
            b"user" => record.user = value,
            b"webHostHtmlMessage" => record.web_host_html_message = value,
            b"time" => {
                record.time = OffsetDateTime::parse(&value, &Rfc3339)
                    .map_err(|err| CodecError::Decode(format!("invalid time {value:?}: {err}")))?;
                time_seen = true;
            }
            b"statusCode" => {
                record.status_code = value.trim().parse().map_err(|err| {
                    CodecError::Decode(format!("invalid statusCode {value:?}: {err}"))
                })?;
            }
            _ => {}
        }
    }
    if !time_seen {
        return Err(CodecError::Decode("missing time attribute".to_string()));
    }
    Ok(record)
}

/// Reads and unescapes a single named attribute.
fn read_attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, CodecError> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(decode_failure)?;
        if attribute.key.as_ref() == key {
            let value = attribute.unescape_value().map_err(decode_failure)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
