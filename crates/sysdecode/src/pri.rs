//! `<N>` priority prefix handling.
//!
//! The priority encodes facility and severity as `facility * 8 + severity`
//! and precedes the variant text on the wire, e.g. `<165>1 2003-...`.
//! It is split off before variant dispatch so the variant parsers only
//! ever see the unwrapped message text.

use serde::Serialize;

use crate::facility::Facility;
use crate::severity::Severity;

/// Largest valid priority: facility 23 (local7), severity 7 (debug).
pub const MAX_PRI: u8 = 191;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pri {
    pub facility: Facility,
    pub severity: Severity,
}

impl Pri {
    pub fn from_raw(value: u8) -> Option<Self> {
        if value > MAX_PRI {
            return None;
        }
        let facility = Facility::from_raw(value >> 3)?;
        let severity = Severity::from_raw(value & 0x07)?;
        Some(Pri { facility, severity })
    }

    /// The wire value, `facility * 8 + severity`.
    pub fn value(&self) -> u8 {
        (self.facility as u8) << 3 | self.severity as u8
    }
}

/// Split a leading `<N>` priority prefix off `line`.
///
/// Returns the decoded priority and the remainder after `>`. A line
/// without a well-formed prefix (no `<`, no digits, missing `>`, value
/// over [`MAX_PRI`]) comes back unchanged with no priority; a malformed
/// prefix is not an error, the whole line simply goes to the variant
/// parsers as-is.
pub fn split_pri(line: &str) -> (Option<Pri>, &str) {
    if !line.starts_with('<') {
        return (None, line);
    }
    let body = &line[1..];

    // Longest valid prefix is "191>", so '>' can only sit in the first four bytes
    let scan = &body.as_bytes()[..body.len().min(4)];
    let end = match scan.iter().position(|&b| b == b'>') {
        Some(idx) => idx,
        None => return (None, line),
    };

    let digits = &body[..end];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (None, line);
    }

    let value = match digits.parse::<u8>() {
        Ok(value) => value,
        Err(_) => return (None, line),
    };

    match Pri::from_raw(value) {
        Some(pri) => (Some(pri), &body[end + 1..]),
        None => (None, line),
    }
}
