//! Read cursor over a single syslog message.
//!
//! One scanner is built per message and handed through the variant chain.
//! It owns the read position and the diagnostic sink; decoded values are
//! written onto the entry by the variant parsers. Positions are byte
//! offsets into the original text, so callers can recover the exact raw
//! substring for any span they scanned.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::NIL;

/// Characters that terminate a word: the structural characters of the
/// structured data grammar, plus the field separator.
const WORD_DELIMITERS: [char; 5] = [' ', '=', ']', '[', '"'];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Expected '{0}'")]
    ExpectedChar(char),

    #[error("Expected a word")]
    ExpectedWord,

    #[error("Unterminated quoted string")]
    UnterminatedString,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

#[derive(Debug)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    errors: Vec<String>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Rewind to the start of input and drop accumulated diagnostics.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.errors.clear();
    }

    /// The full input text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The unread remainder, from the cursor to the end.
    pub fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor. `pos` must be an offset previously obtained from
    /// [`position`](Self::position).
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// The character at the cursor, `None` at end of input.
    pub fn current(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Step over the character at the cursor, if any.
    pub fn advance(&mut self) {
        if let Some(ch) = self.current() {
            self.pos += ch.len_utf8();
        }
    }

    /// Consume `literal` when the text at the cursor starts with it.
    pub fn match_literal(&mut self, literal: &str) -> bool {
        if self.text[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Skip contiguous space characters. The syslog grammar separates
    /// fields with literal spaces only, so tabs and newlines stay put.
    pub fn skip_spaces(&mut self) {
        while self.current() == Some(' ') {
            self.pos += 1;
        }
    }

    /// Read a maximal run of non-delimiter characters, skipping leading
    /// spaces first.
    pub fn read_word(&mut self) -> Result<&'a str, ScanError> {
        self.skip_spaces();
        let start = self.pos;
        while let Some(ch) = self.current() {
            if WORD_DELIMITERS.contains(&ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        if self.pos == start {
            if self.eof() {
                return Err(ScanError::UnexpectedEof);
            }
            return Err(ScanError::ExpectedWord);
        }
        Ok(&self.text[start..self.pos])
    }

    /// Read a word, mapping the NIL value (`-`) to `None`.
    pub fn read_word_or_nil(&mut self) -> Result<Option<&'a str>, ScanError> {
        let word = self.read_word()?;
        Ok(if word == NIL { None } else { Some(word) })
    }

    /// Consume exactly `expected` at the cursor.
    pub fn read_symbol(&mut self, expected: char) -> Result<(), ScanError> {
        match self.current() {
            Some(ch) if ch == expected => {
                self.pos += ch.len_utf8();
                Ok(())
            }
            _ => Err(ScanError::ExpectedChar(expected)),
        }
    }

    /// Read a `"`-delimited string. A backslash escapes the following
    /// character, covering the `\"`, `\\` and `\]` sequences RFC 5424
    /// requires inside parameter values.
    pub fn read_quoted_string(&mut self) -> Result<String, ScanError> {
        self.read_symbol('"')?;
        let mut value = String::new();
        let mut escaped = false;
        while let Some(ch) = self.current() {
            self.pos += ch.len_utf8();
            if escaped {
                value.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                return Ok(value);
            } else {
                value.push(ch);
            }
        }
        Err(ScanError::UnterminatedString)
    }

    /// Read one word as an RFC 3339 timestamp. The NIL value (`-`) reads
    /// as an absent timestamp.
    pub fn parse_standard_timestamp(
        &mut self,
    ) -> Result<Option<DateTime<FixedOffset>>, ScanError> {
        let word = self.read_word()?;
        if word == NIL {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(word)
            .map(Some)
            .map_err(|_| ScanError::InvalidTimestamp(word.to_string()))
    }

    /// Append a diagnostic. Recording never aborts anything on its own;
    /// callers decide separately whether to keep parsing.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Drain accumulated diagnostics, leaving the sink empty.
    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }
}
