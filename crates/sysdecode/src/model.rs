use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::facility::Facility;
use crate::serde_utils::serialize_structured_data;
use crate::severity::Severity;

/// Which syslog variant a message was decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadType {
    /// RFC 5424 structured syslog
    Rfc5424,
    /// No variant claimed the message (plain text fallback)
    Unknown,
}

impl PayloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadType::Rfc5424 => "rfc5424",
            PayloadType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Line too large: {0} bytes (max: {1} bytes)")]
    LineTooLarge(usize, usize),

    #[error("Non-UTF8 content")]
    NonUtf8,
}

/// The RFC 5424 header fields.
///
/// Every field can carry the NIL value (`-`) on the wire; NIL decodes to
/// `None`, never to a literal `"-"` string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Header {
    /// Serializes as an ISO-8601 string automatically
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub host_name: Option<String>,
    pub app_name: Option<String>,
    pub proc_id: Option<String>,
    pub msg_id: Option<String>,
}

/// One structured data parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameValuePair {
    pub name: String,
    pub value: String,
}

/// Structured data elements keyed by element id. Parameters keep their
/// wire order; a repeated element id keeps the last occurrence only.
pub type StructuredData = HashMap<String, Vec<NameValuePair>>;

/// A decoded syslog entry.
///
/// Variant parsers mutate a pre-allocated entry in place;
/// [`MessageDecoder`](crate::decoder::MessageDecoder) returns it by value.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedMessage {
    /// Which variant claimed the message
    pub payload_type: PayloadType,

    /// Facility from the `<N>` priority prefix, when one was present
    pub facility: Option<Facility>,

    /// Severity from the `<N>` priority prefix, when one was present
    pub severity: Option<Severity>,

    pub header: Header,

    /// Serialized as nested JSON objects for downstream processing
    #[serde(serialize_with = "serialize_structured_data")]
    pub structured_data: StructuredData,

    /// The exact input span the structured data section occupied: the
    /// bracketed text verbatim, `"-"` when the section is absent or NIL,
    /// or `""` after an absorbed structured data failure
    pub raw_structured_data: Option<String>,

    /// Free text body; `None` when the input ends at the message boundary
    pub message: Option<String>,

    /// Diagnostics accumulated while decoding
    pub errors: Vec<String>,

    /// Original raw payload (always preserved)
    /// Skipped during serialization - raw bytes travel separately
    #[serde(skip)]
    pub raw: Bytes,
}

impl ParsedMessage {
    /// A fresh entry with nothing decoded yet.
    pub fn new(raw: Bytes) -> Self {
        Self {
            payload_type: PayloadType::Unknown,
            facility: None,
            severity: None,
            header: Header::default(),
            structured_data: StructuredData::new(),
            raw_structured_data: None,
            message: None,
            errors: Vec::new(),
            raw,
        }
    }
}

impl Default for ParsedMessage {
    fn default() -> Self {
        Self::new(Bytes::new())
    }
}
