//! IMAP response line parser.
//!
//! This module turns one server response line into a [`Response`]. The
//! parser is sans-I/O: the caller hands it a complete line with the CRLF
//! stripped and any literal payloads already spliced in after their `{n}`
//! announcement.
//!
//! # Architecture
//!
//! Parsing runs in three stages, each feeding the next:
//!
//! - **Line tokenizer**: takes the tag, the command and, for status
//!   responses, the human-readable text
//! - **Tree builder**: a character state machine that builds a tree of
//!   lists, sections, strings, literals, atoms, sequence sets and partials
//! - **Flattener**: walks the closed tree and produces typed [`Attribute`]s
//!
//! # Example
//!
//! ```
//! use imap_handler::{Attribute, Options, parse};
//!
//! let response = parse("* 1 FETCH (UID 123 FLAGS (\\Seen))", Options::default()).unwrap();
//!
//! assert_eq!(response.tag, "*");
//! assert_eq!(response.command, "1");
//! assert_eq!(response.attributes[0], Attribute::atom("FETCH"));
//! ```
//!
//! [`Attribute`]: crate::Attribute

mod flatten;
mod line;
mod tree;

use crate::Result;
use crate::options::Options;
use crate::types::{Attribute, Response};

use line::LineTokenizer;

/// Parses a single response line.
///
/// The first error aborts the parse. A malformed line means the protocol
/// stream may be out of sync, so callers should treat the error as fatal to
/// the current exchange.
pub fn parse(line: &str, options: Options) -> Result<Response> {
    match parse_line(line, options) {
        Ok(response) => {
            tracing::trace!(
                tag = %response.tag,
                command = %response.command,
                attributes = response.attributes.len(),
                "parsed response"
            );
            Ok(response)
        }
        Err(e) => {
            tracing::debug!(error = %e, position = e.position(), "failed to parse response");
            Err(e)
        }
    }
}

fn parse_line(line: &str, options: Options) -> Result<Response> {
    let mut tokenizer = LineTokenizer::new(line);

    let tag = tokenizer.take_tag()?.to_string();
    tokenizer.take_space()?;
    let command = tokenizer.take_command()?;

    let mut attributes = Vec::new();
    if !tokenizer.remainder().trim().is_empty() {
        tokenizer.take_space()?;
        attributes = tokenizer.take_attributes(options)?;
    }

    if let Some(text) = tokenizer.take_human_readable() {
        attributes.push(Attribute::Text(text));
    }

    Ok(Response {
        tag,
        command,
        attributes,
    })
}

/// Response parser holding a fixed set of [`Options`].
///
/// Keeps no state between calls; each call to [`ResponseParser::parse`] is
/// independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser {
    options: Options,
}

impl ResponseParser {
    /// Creates a parser with default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: Options::new(),
        }
    }

    /// Creates a parser with the given options.
    #[must_use]
    pub const fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Returns the options this parser uses.
    #[must_use]
    pub const fn options(&self) -> Options {
        self.options
    }

    /// Parses a single response line.
    pub fn parse(&self, line: &str) -> Result<Response> {
        parse(line, self.options)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::types::Partial;

    fn parse_default(line: &str) -> Result<Response> {
        parse(line, Options::default())
    }

    #[test]
    fn test_tagged_ok() {
        let response = parse_default("A001 OK LOGIN completed").unwrap();
        assert_eq!(response.tag, "A001");
        assert_eq!(response.command, "OK");
        assert_eq!(response.attributes, vec![Attribute::text("LOGIN completed")]);
    }

    #[test]
    fn test_status_without_text() {
        let response = parse_default("A1 OK").unwrap();
        assert!(response.attributes.is_empty());

        let response = parse_default("A1 NO ").unwrap();
        assert!(response.attributes.is_empty());
    }

    #[test]
    fn test_response_code() {
        let response = parse_default("* OK [UIDVALIDITY 3857529045] UIDs valid").unwrap();
        assert_eq!(
            response.attributes,
            vec![
                Attribute::atom_with_section(
                    "",
                    vec![Attribute::atom("UIDVALIDITY"), Attribute::atom("3857529045")]
                ),
                Attribute::text("UIDs valid"),
            ]
        );
        assert_eq!(response.human_readable(), Some("UIDs valid"));
        assert_eq!(response.response_code().unwrap().len(), 2);
    }

    #[test]
    fn test_response_code_with_list() {
        let response =
            parse_default("* OK [PERMANENTFLAGS (\\Deleted \\Seen \\*)] Limited").unwrap();
        assert_eq!(
            response.response_code().unwrap(),
            &[
                Attribute::atom("PERMANENTFLAGS"),
                Attribute::list(vec![
                    Attribute::atom("\\Deleted"),
                    Attribute::atom("\\Seen"),
                    Attribute::atom("\\*"),
                ]),
            ]
        );
    }

    #[test]
    fn test_response_code_with_sequence() {
        let response =
            parse_default("A3 OK [COPYUID 38505 304,319:320 3956:3958] Done").unwrap();
        assert_eq!(
            response.response_code().unwrap(),
            &[
                Attribute::atom("COPYUID"),
                Attribute::atom("38505"),
                Attribute::sequence_set("304,319:320"),
                Attribute::sequence_set("3956:3958"),
            ]
        );
    }

    #[test]
    fn test_referral() {
        let response = parse_default(
            "A2 NO [REFERRAL IMAP://user;AUTH=GSSAPI@SERVER2/] Remote Server",
        )
        .unwrap();
        assert_eq!(
            response.attributes,
            vec![
                Attribute::atom_with_section(
                    "",
                    vec![
                        Attribute::atom("REFERRAL"),
                        Attribute::atom("IMAP://user;AUTH=GSSAPI@SERVER2/"),
                    ]
                ),
                Attribute::text("Remote Server"),
            ]
        );
    }

    #[test]
    fn test_fetch_flags() {
        let response = parse_default("* 1 FETCH (UID 123 FLAGS (\\Seen))").unwrap();
        assert!(response.is_untagged());
        assert_eq!(response.command, "1");
        assert_eq!(
            response.attributes,
            vec![
                Attribute::atom("FETCH"),
                Attribute::list(vec![
                    Attribute::atom("UID"),
                    Attribute::atom("123"),
                    Attribute::atom("FLAGS"),
                    Attribute::list(vec![Attribute::atom("\\Seen")]),
                ]),
            ]
        );
    }

    #[test]
    fn test_fetch_body_section_partial() {
        let response =
            parse_default("* 2 FETCH (BODY[HEADER.FIELDS (SUBJECT)]<0.100> {5}\r\nhello)").unwrap();
        let items = response.attributes[1].items().unwrap();
        assert_eq!(
            items[0],
            Attribute::Atom {
                value: "BODY".to_string(),
                section: Some(vec![
                    Attribute::atom("HEADER.FIELDS"),
                    Attribute::list(vec![Attribute::atom("SUBJECT")]),
                ]),
                partial: Some(Partial::new(0, 100)),
            }
        );
        assert_eq!(items[1], Attribute::literal("hello"));
    }

    #[test]
    fn test_uid_command() {
        let response = parse_default("A5 UID FETCH 1:* (FLAGS)").unwrap();
        assert_eq!(response.command, "UID FETCH");
        assert_eq!(
            response.attributes,
            vec![
                Attribute::sequence_set("1:*"),
                Attribute::list(vec![Attribute::atom("FLAGS")]),
            ]
        );
    }

    #[test]
    fn test_list_response() {
        let response = parse_default("* LIST (\\HasNoChildren) \"/\" \"INBOX\"").unwrap();
        assert_eq!(
            response.attributes,
            vec![
                Attribute::list(vec![Attribute::atom("\\HasNoChildren")]),
                Attribute::quoted("/"),
                Attribute::quoted("INBOX"),
            ]
        );

        let response = parse_default("A1 LIST \"\" %").unwrap();
        assert_eq!(
            response.attributes,
            vec![Attribute::quoted(""), Attribute::atom("%")]
        );

        let response = parse_default("A1 LIST \"\" *").unwrap();
        assert_eq!(
            response.attributes,
            vec![Attribute::quoted(""), Attribute::atom("*")]
        );
    }

    #[test]
    fn test_continuation() {
        let response = parse_default("+ idling").unwrap();
        assert!(response.is_continuation());
        assert_eq!(response.command, "idling");
        assert!(response.attributes.is_empty());
    }

    #[test]
    fn test_double_space_before_attributes() {
        let err = parse_default("* SEARCH  1").unwrap_err();
        assert_eq!(err, Error::UnexpectedWhitespace { position: 9 });
    }

    #[test]
    fn test_response_parser_options() {
        let strict = ResponseParser::new();
        assert!(strict.parse("* 1 FETCH (BODY[] {2+}\r\nhi)").is_err());

        let lenient = ResponseParser::with_options(Options::new().literal_plus(true));
        assert!(lenient.options().literal_plus);
        let response = lenient.parse("* 1 FETCH (BODY[] {2+}\r\nhi)").unwrap();
        assert_eq!(
            response.attributes[1],
            Attribute::list(vec![
                Attribute::atom_with_section("BODY", vec![]),
                Attribute::literal("hi"),
            ])
        );
    }
}
