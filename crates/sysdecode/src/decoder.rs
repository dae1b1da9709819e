//! Decoding entry points.
//!
//! The decoder splits the optional `<N>` priority prefix off the line,
//! then walks an ordered chain of variant parsers until one claims the
//! payload. When none does, the entry falls back to plain text so no
//! input is ever dropped.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::formats::Rfc5424Parser;
use crate::model::{ParseError, ParsedMessage};
use crate::pri::split_pri;
use crate::scanner::Scanner;
use crate::traits::VariantParser;
use crate::MAX_LINE_SIZE;

/// Dispatcher over the known syslog variants.
pub struct MessageDecoder {
    parsers: Vec<Box<dyn VariantParser>>,
}

impl MessageDecoder {
    pub fn new() -> Self {
        let parsers: Vec<Box<dyn VariantParser>> = vec![
            // Order matters! More specific variants first
            Box::new(Rfc5424Parser),
        ];

        Self { parsers }
    }

    /// Build a decoder with a custom variant chain, tried in the order
    /// given.
    pub fn with_parsers(parsers: Vec<Box<dyn VariantParser>>) -> Self {
        Self { parsers }
    }

    /// Decode one message. Infallible: an unrecognized payload keeps the
    /// `Unknown` tag and carries the text as its message.
    ///
    /// A variant that recognized the line but aborted partway leaves its
    /// payload tag and diagnostics on the entry; the text still lands in
    /// `message` through the fallback.
    pub fn decode(&self, line: &str) -> ParsedMessage {
        let mut entry = ParsedMessage::default();

        let (pri, rest) = split_pri(line);
        if let Some(pri) = pri {
            entry.facility = Some(pri.facility);
            entry.severity = Some(pri.severity);
        }

        let mut scanner = Scanner::new(rest);
        let mut claimed = false;
        for parser in &self.parsers {
            if parser.try_parse(&mut scanner, &mut entry) {
                debug!(payload_type = entry.payload_type.as_str(), "Variant claimed message");
                claimed = true;
                break;
            }
        }

        if !claimed {
            trace!("No variant claimed the message, keeping it as plain text");
            let body = rest.trim_end_matches(['\r', '\n', ' ']);
            if !body.is_empty() {
                entry.message = Some(body.to_string());
            }
        }

        entry.errors = scanner.take_errors();
        entry
    }

    /// Decode a raw byte payload, retaining the bytes on the entry.
    /// Oversized and non-UTF-8 input is rejected before any decoding.
    pub fn decode_bytes(&self, raw: &[u8]) -> Result<ParsedMessage, ParseError> {
        if raw.len() > MAX_LINE_SIZE {
            return Err(ParseError::LineTooLarge(raw.len(), MAX_LINE_SIZE));
        }
        let line = std::str::from_utf8(raw).map_err(|_| ParseError::NonUtf8)?;

        let mut entry = self.decode(line);
        entry.raw = Bytes::copy_from_slice(raw);
        Ok(entry)
    }
}

impl Default for MessageDecoder {
    fn default() -> Self {
        Self::new()
    }
}
