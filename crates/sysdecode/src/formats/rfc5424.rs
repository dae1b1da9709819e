use crate::bom::strip_bom;
use crate::model::{Header, NameValuePair, StructuredData};
use crate::scanner::ScanError;
use crate::traits::*;
use crate::NIL;

/// Parser for RFC 5424 syslog messages.
///
/// Expects the scanner positioned at the version token, after any `<N>`
/// priority prefix has been split off. Recognition hinges entirely on the
/// `"1 "` version token. Past it, the two later phases have different
/// tolerance levels: a header error aborts the attempt, a structured data
/// error is recorded and absorbed so the message body still decodes.
pub struct Rfc5424Parser;

impl VariantParser for Rfc5424Parser {
    fn try_parse(&self, scanner: &mut Scanner<'_>, entry: &mut ParsedMessage) -> bool {
        scanner.reset();
        if !scanner.match_literal("1 ") {
            // Not this variant; leave the entry and the sink untouched
            return false;
        }

        entry.payload_type = PayloadType::Rfc5424;

        match parse_header(scanner) {
            Ok(header) => entry.header = header,
            Err(err) => {
                scanner.add_error(err.to_string());
                return false;
            }
        }

        entry.raw_structured_data =
            Some(parse_structured_data(scanner, &mut entry.structured_data));
        entry.message = read_message(scanner);
        true
    }

    fn payload_type(&self) -> PayloadType {
        PayloadType::Rfc5424
    }
}

/// Read the five header tokens in fixed order. Any missing or malformed
/// token fails the whole header.
fn parse_header(scanner: &mut Scanner<'_>) -> Result<Header, ScanError> {
    Ok(Header {
        timestamp: scanner.parse_standard_timestamp()?,
        host_name: scanner.read_word_or_nil()?.map(|s| s.to_string()),
        app_name: scanner.read_word_or_nil()?.map(|s| s.to_string()),
        proc_id: scanner.read_word_or_nil()?.map(|s| s.to_string()),
        msg_id: scanner.read_word_or_nil()?.map(|s| s.to_string()),
    })
}

/// Decode the structured data section, inserting elements as they
/// complete.
///
/// Returns the raw text to store on the entry: the exact bracketed span
/// trimmed of surrounding spaces, `"-"` when the section is absent or
/// NIL, or `""` after an absorbed failure. Elements parsed before a
/// failure stay in the map, and the cursor stays at the failure point.
fn parse_structured_data(scanner: &mut Scanner<'_>, data: &mut StructuredData) -> String {
    scanner.skip_spaces();

    if scanner.current() == Some('-') {
        scanner.advance();
        return NIL.to_string();
    }

    if scanner.current() != Some('[') {
        // Not an error: plenty of senders omit the section entirely, so
        // whatever sits here belongs to the message body
        return NIL.to_string();
    }

    let start = scanner.position();
    while !scanner.eof() {
        match parse_element(scanner) {
            Ok(Some((id, params))) => {
                // A repeated element id keeps the last occurrence
                data.insert(id, params);
            }
            Ok(None) => break,
            Err(err) => {
                scanner.add_error(err.to_string());
                return String::new();
            }
        }
    }

    scanner.text()[start..scanner.position()]
        .trim_matches(' ')
        .to_string()
}

/// Parse one `[id name="value" ...]` element. `None` means the cursor is
/// not at an element start, which ends the section without error.
///
/// The id may be omitted: when the first token is directly followed by
/// `=` it is actually the first parameter's name, and the element is
/// keyed under the empty string.
fn parse_element(
    scanner: &mut Scanner<'_>,
) -> Result<Option<(String, Vec<NameValuePair>)>, ScanError> {
    if scanner.current() != Some('[') {
        return Ok(None);
    }
    scanner.advance();

    let first = scanner.read_word()?.to_string();
    scanner.skip_spaces();

    let mut params = Vec::new();
    let id = if scanner.current() == Some('=') {
        scanner.read_symbol('=')?;
        let value = scanner.read_quoted_string()?;
        params.push(NameValuePair { name: first, value });
        scanner.skip_spaces();
        String::new()
    } else {
        first
    };

    while scanner.current() != Some(']') {
        let name = scanner.read_word()?.to_string();
        scanner.read_symbol('=')?;
        let value = scanner.read_quoted_string()?;
        params.push(NameValuePair { name, value });
        scanner.skip_spaces();
    }
    scanner.read_symbol(']')?;

    Ok(Some((id, params)))
}

/// Everything after the structured data section. End of input decodes as
/// no message at all, never as an empty string; a tail that trims down to
/// nothing (spaces, a bare byte order mark) decodes the same way.
fn read_message(scanner: &mut Scanner<'_>) -> Option<String> {
    if scanner.eof() {
        return None;
    }
    let body = strip_bom(scanner.remaining().trim_start_matches(' '));
    if body.is_empty() {
        return None;
    }
    Some(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn parse(input: &str) -> (bool, ParsedMessage, Vec<String>) {
        let parser = Rfc5424Parser;
        let mut scanner = Scanner::new(input);
        let mut entry = ParsedMessage::default();
        let matched = parser.try_parse(&mut scanner, &mut entry);
        let errors = scanner.take_errors();
        (matched, entry, errors)
    }

    fn pair(name: &str, value: &str) -> NameValuePair {
        NameValuePair {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Variant detection
    // ─────────────────────────────────────────────────────────

    #[test]
    fn rejects_input_without_version_token() {
        let samples = [
            "",
            "1",
            "1x not a version token",
            "2 2021-03-23T10:20:30.5Z myhost myapp - - -",
            "Oct 11 22:14:15 mymachine su: 'su root' failed",
            "<165>1 2021-03-23T10:20:30.5Z myhost myapp - - -",
        ];

        for sample in samples {
            let (matched, entry, errors) = parse(sample);
            assert!(!matched, "input: {:?}", sample);
            assert!(errors.is_empty(), "input: {:?}", sample);
            // The entry must be completely unmodified
            assert_eq!(entry.payload_type, PayloadType::Unknown);
            assert_eq!(entry.header, Header::default());
            assert!(entry.structured_data.is_empty());
            assert_eq!(entry.raw_structured_data, None);
            assert_eq!(entry.message, None);
        }
    }

    #[test]
    fn payload_type_is_tagged_once_version_matches() {
        let (matched, entry, _) = parse("1 - - - - - -");
        assert!(matched);
        assert_eq!(entry.payload_type, PayloadType::Rfc5424);
        assert_eq!(Rfc5424Parser.payload_type(), PayloadType::Rfc5424);
    }

    // ─────────────────────────────────────────────────────────
    // Header
    // ─────────────────────────────────────────────────────────

    #[test]
    fn decodes_full_header() {
        let (matched, entry, errors) =
            parse("1 2021-03-23T10:20:30.5Z myhost myapp 123 ID47 - msg");
        assert!(matched);
        assert!(errors.is_empty());
        assert_eq!(
            entry.header.timestamp,
            Some(DateTime::parse_from_rfc3339("2021-03-23T10:20:30.5Z").unwrap())
        );
        assert_eq!(entry.header.host_name.as_deref(), Some("myhost"));
        assert_eq!(entry.header.app_name.as_deref(), Some("myapp"));
        assert_eq!(entry.header.proc_id.as_deref(), Some("123"));
        assert_eq!(entry.header.msg_id.as_deref(), Some("ID47"));
    }

    #[test]
    fn nil_header_fields_become_absent() {
        let (matched, entry, _) = parse("1 - - - - - free text body");
        assert!(matched);
        assert_eq!(entry.header.timestamp, None);
        assert_eq!(entry.header.host_name, None);
        assert_eq!(entry.header.app_name, None);
        assert_eq!(entry.header.proc_id, None);
        assert_eq!(entry.header.msg_id, None);
        assert_eq!(entry.raw_structured_data.as_deref(), Some("-"));
        assert_eq!(entry.message.as_deref(), Some("free text body"));
    }

    #[test]
    fn timestamp_with_numeric_offset() {
        let (matched, entry, _) =
            parse("1 2003-08-24T05:14:15.000003-07:00 192.0.2.1 myproc 8710 - - It's time!");
        assert!(matched);
        assert_eq!(
            entry.header.timestamp,
            Some(DateTime::parse_from_rfc3339("2003-08-24T05:14:15.000003-07:00").unwrap())
        );
        assert_eq!(entry.header.host_name.as_deref(), Some("192.0.2.1"));
        assert_eq!(entry.header.proc_id.as_deref(), Some("8710"));
        assert_eq!(entry.header.msg_id, None);
        assert_eq!(entry.message.as_deref(), Some("It's time!"));
    }

    #[test]
    fn malformed_timestamp_aborts() {
        let (matched, entry, errors) = parse("1 notatime myhost myapp - - -");
        assert!(!matched);
        assert_eq!(errors, ["Invalid timestamp: notatime"]);
        // Recognition already happened, the rest of the entry did not
        assert_eq!(entry.payload_type, PayloadType::Rfc5424);
        assert_eq!(entry.header, Header::default());
        assert_eq!(entry.raw_structured_data, None);
        assert_eq!(entry.message, None);
    }

    #[test]
    fn truncated_header_aborts() {
        let (matched, entry, errors) = parse("1 2021-03-23T10:20:30.5Z myhost");
        assert!(!matched);
        assert_eq!(errors, ["Unexpected end of input"]);
        assert_eq!(entry.header, Header::default());
    }

    #[test]
    fn header_failure_keeps_prior_header_value() {
        let parser = Rfc5424Parser;
        let mut scanner = Scanner::new("1 notatime myhost myapp - - -");
        let mut entry = ParsedMessage::default();
        entry.header.host_name = Some("earlier".to_string());

        assert!(!parser.try_parse(&mut scanner, &mut entry));
        assert_eq!(entry.header.host_name.as_deref(), Some("earlier"));
    }

    // ─────────────────────────────────────────────────────────
    // Structured data
    // ─────────────────────────────────────────────────────────

    #[test]
    fn decodes_adjacent_elements_and_exact_raw_span() {
        let (matched, entry, errors) = parse(
            "1 2021-03-23T10:20:30.5Z myhost myapp 123 ID47 [exampleSDID@32473 iut=\"3\" eventSource=\"App\"][x] some message",
        );
        assert!(matched);
        assert!(errors.is_empty());
        assert_eq!(entry.structured_data.len(), 2);
        assert_eq!(
            entry.structured_data["exampleSDID@32473"],
            vec![pair("iut", "3"), pair("eventSource", "App")]
        );
        assert!(entry.structured_data["x"].is_empty());
        assert_eq!(
            entry.raw_structured_data.as_deref(),
            Some("[exampleSDID@32473 iut=\"3\" eventSource=\"App\"][x]")
        );
        assert_eq!(entry.message.as_deref(), Some("some message"));
    }

    #[test]
    fn space_between_elements_ends_the_section() {
        let (matched, entry, _) = parse("1 - - - - - [a x=\"1\"] [b y=\"2\"]");
        assert!(matched);
        assert_eq!(entry.structured_data.len(), 1);
        assert_eq!(entry.structured_data["a"], vec![pair("x", "1")]);
        assert_eq!(entry.raw_structured_data.as_deref(), Some("[a x=\"1\"]"));
        // The second bracket group is message text, not structured data
        assert_eq!(entry.message.as_deref(), Some("[b y=\"2\"]"));
    }

    #[test]
    fn internal_spacing_survives_in_raw_span() {
        let (matched, entry, _) = parse("1 - - - - - [a  x=\"1\"   y=\"2\"  ] tail");
        assert!(matched);
        assert_eq!(entry.structured_data["a"], vec![pair("x", "1"), pair("y", "2")]);
        assert_eq!(
            entry.raw_structured_data.as_deref(),
            Some("[a  x=\"1\"   y=\"2\"  ]")
        );
        assert_eq!(entry.message.as_deref(), Some("tail"));
    }

    #[test]
    fn nil_section_consumes_one_dash() {
        let (matched, entry, _) = parse("1 - - - - - - body");
        assert!(matched);
        assert!(entry.structured_data.is_empty());
        assert_eq!(entry.raw_structured_data.as_deref(), Some("-"));
        assert_eq!(entry.message.as_deref(), Some("body"));
    }

    #[test]
    fn nil_section_at_end_of_input() {
        let (matched, entry, _) = parse("1 - - - - - -");
        assert!(matched);
        assert_eq!(entry.raw_structured_data.as_deref(), Some("-"));
        assert_eq!(entry.message, None);
    }

    #[test]
    fn absent_section_leaves_remainder_for_message() {
        let (matched, entry, errors) =
            parse("1 2021-03-23T10:20:30.5Z host app proc msgid no-brackets-here trailing text");
        assert!(matched);
        assert!(errors.is_empty());
        assert!(entry.structured_data.is_empty());
        assert_eq!(entry.raw_structured_data.as_deref(), Some("-"));
        assert_eq!(entry.message.as_deref(), Some("no-brackets-here trailing text"));
    }

    #[test]
    fn omitted_identifier_keys_under_empty_string() {
        let (matched, entry, _) = parse("1 - - - - - [x=\"1\"]");
        assert!(matched);
        assert_eq!(entry.structured_data.len(), 1);
        assert_eq!(entry.structured_data[""], vec![pair("x", "1")]);
        assert_eq!(entry.raw_structured_data.as_deref(), Some("[x=\"1\"]"));
    }

    #[test]
    fn omitted_identifier_with_further_params() {
        let (matched, entry, _) =
            parse("1 - - - - - [eventSource=\"Application\" eventID=\"1011\"] hi");
        assert!(matched);
        assert_eq!(
            entry.structured_data[""],
            vec![pair("eventSource", "Application"), pair("eventID", "1011")]
        );
        assert_eq!(entry.message.as_deref(), Some("hi"));
    }

    #[test]
    fn duplicate_element_id_keeps_last() {
        let (matched, entry, _) = parse("1 - - - - - [dup a=\"1\"][dup b=\"2\"]");
        assert!(matched);
        assert_eq!(entry.structured_data.len(), 1);
        assert_eq!(entry.structured_data["dup"], vec![pair("b", "2")]);
    }

    #[test]
    fn params_keep_wire_order() {
        let (matched, entry, _) =
            parse("1 - - - - - [sd z=\"26\" a=\"1\" m=\"13\"]");
        assert!(matched);
        assert_eq!(
            entry.structured_data["sd"],
            vec![pair("z", "26"), pair("a", "1"), pair("m", "13")]
        );
    }

    #[test]
    fn escaped_characters_in_param_values() {
        let (matched, entry, _) = parse(
            r#"1 - - - - - [a quote="say \"hi\"" back="a\\b" bracket="\]"]"#,
        );
        assert!(matched);
        assert_eq!(
            entry.structured_data["a"],
            vec![
                pair("quote", "say \"hi\""),
                pair("back", "a\\b"),
                pair("bracket", "]"),
            ]
        );
    }

    #[test]
    fn empty_param_value() {
        let (matched, entry, _) = parse("1 - - - - - [a x=\"\"]");
        assert!(matched);
        assert_eq!(entry.structured_data["a"], vec![pair("x", "")]);
    }

    // ─────────────────────────────────────────────────────────
    // Absorbed structured data failures
    // ─────────────────────────────────────────────────────────

    #[test]
    fn unterminated_value_is_absorbed() {
        let (matched, entry, errors) = parse("1 - - - - - [id eventSource=\"Application");
        assert!(matched, "the attempt still succeeds");
        assert_eq!(errors, ["Unterminated quoted string"]);
        assert_eq!(entry.raw_structured_data.as_deref(), Some(""));
        assert!(entry.structured_data.is_empty());
        assert_eq!(entry.message, None);
    }

    #[test]
    fn missing_equals_is_absorbed() {
        let (matched, entry, errors) = parse("1 - - - - - [id param value\"] tail");
        assert!(matched);
        assert_eq!(errors, ["Expected '='"]);
        assert_eq!(entry.raw_structured_data.as_deref(), Some(""));
        // No rollback: the message phase picks up at the failure point
        assert_eq!(entry.message.as_deref(), Some("value\"] tail"));
    }

    #[test]
    fn empty_brackets_are_absorbed() {
        let (matched, entry, errors) = parse("1 - - - - - []");
        assert!(matched);
        assert_eq!(errors, ["Expected a word"]);
        assert_eq!(entry.raw_structured_data.as_deref(), Some(""));
        assert_eq!(entry.message.as_deref(), Some("]"));
    }

    #[test]
    fn elements_before_a_failure_stay_inserted() {
        let (matched, entry, errors) = parse("1 - - - - - [ok a=\"1\"][bad x=nope]");
        assert!(matched);
        assert_eq!(errors, ["Expected '\"'"]);
        assert_eq!(entry.structured_data["ok"], vec![pair("a", "1")]);
        assert!(!entry.structured_data.contains_key("bad"));
        assert_eq!(entry.raw_structured_data.as_deref(), Some(""));
    }

    // ─────────────────────────────────────────────────────────
    // Message body
    // ─────────────────────────────────────────────────────────

    #[test]
    fn eof_at_message_boundary_is_absent_not_empty() {
        let (matched, entry, _) = parse("1 - - - - ID47 [a x=\"1\"]");
        assert!(matched);
        assert_eq!(entry.message, None);
    }

    #[test]
    fn bom_after_structured_data_is_stripped() {
        let (matched, entry, _) = parse(
            "1 2003-10-11T22:14:15.003Z mymachine.example.com evntslog - ID47 [exampleSDID@32473 iut=\"3\"] \u{feff}An application event log entry...",
        );
        assert!(matched);
        assert_eq!(
            entry.message.as_deref(),
            Some("An application event log entry...")
        );
    }

    #[test]
    fn spaces_only_tail_is_absent() {
        let (matched, entry, _) = parse("1 - - - - - -   ");
        assert!(matched);
        assert_eq!(entry.message, None);
    }

    #[test]
    fn bom_only_tail_is_absent() {
        let (matched, entry, _) = parse("1 - - - - - - \u{feff}");
        assert!(matched);
        assert_eq!(entry.message, None);
    }

    #[test]
    fn only_literal_spaces_are_trimmed_from_message() {
        let (matched, entry, _) = parse("1 - - - - - -  \tindented");
        assert!(matched);
        assert_eq!(entry.message.as_deref(), Some("\tindented"));
    }
}
