//! Byte order mark handling.
//!
//! RFC 5424 allows the free-text message body to start with a UTF-8 BOM
//! (the three byte sequence EF BB BF, one `U+FEFF` character). The marker
//! is invisible and breaks downstream string comparisons, so it is removed
//! from decoded message bodies.

const BOM: char = '\u{feff}';

/// Strip one leading byte order mark, borrowing either way.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BOM).unwrap_or(text)
}
