//! Line tokenizer.
//!
//! Splits a response line into tag, command and the remainder that holds the
//! attributes. Status responses (`OK`, `NO`, `BAD`, `PREAUTH`, `BYE`) have
//! their human-readable text split off here, so that only the bracketed
//! response code is left for the tree builder.

use crate::options::Options;
use crate::syntax::{CharClass, verify};
use crate::types::{Attribute, is_status_command};
use crate::{Error, Result};

use super::flatten::flatten;
use super::tree::{self, Context};

/// Commands followed by a second command word, as in `UID FETCH`.
const COMPOUND_COMMANDS: [&str; 2] = ["UID", "AUTHENTICATE"];

/// Cursor over a response line.
#[derive(Debug)]
pub(crate) struct LineTokenizer<'a> {
    remainder: &'a str,
    pos: usize,
    status_response: bool,
    human_readable: Option<String>,
}

impl<'a> LineTokenizer<'a> {
    /// Creates a tokenizer at the start of `line`.
    pub(crate) const fn new(line: &'a str) -> Self {
        Self {
            remainder: line,
            pos: 0,
            status_response: false,
            human_readable: None,
        }
    }

    /// Returns the unconsumed part of the line.
    pub(crate) const fn remainder(&self) -> &'a str {
        self.remainder
    }

    /// Takes the human-readable text of a status response, if any.
    pub(crate) fn take_human_readable(&mut self) -> Option<String> {
        self.human_readable.take()
    }

    /// Takes the run of non-whitespace characters at the cursor, validated
    /// against `class`.
    fn take_element(&mut self, class: CharClass) -> Result<&'a str> {
        if self.remainder.starts_with(char::is_whitespace) {
            return Err(Error::UnexpectedWhitespace { position: self.pos });
        }

        let end = self
            .remainder
            .find(char::is_whitespace)
            .unwrap_or(self.remainder.len());
        if end == 0 {
            return Err(Error::UnexpectedEndOfInput { position: self.pos });
        }

        let element = &self.remainder[..end];
        if let Some((index, found)) = verify(element, class) {
            return Err(Error::UnexpectedChar {
                position: self.pos + index,
                found,
            });
        }

        self.pos += element.chars().count();
        self.remainder = &self.remainder[end..];
        Ok(element)
    }

    /// Takes the response tag (`*`, `+` or a command tag).
    pub(crate) fn take_tag(&mut self) -> Result<&'a str> {
        self.take_element(CharClass::ResponseTag)
    }

    /// Takes exactly one space.
    pub(crate) fn take_space(&mut self) -> Result<()> {
        let Some(c) = self.remainder.chars().next() else {
            return Err(Error::UnexpectedEndOfInput { position: self.pos });
        };
        if !CharClass::Sp.contains(c) {
            return Err(Error::UnexpectedChar {
                position: self.pos,
                found: c,
            });
        }
        self.pos += 1;
        self.remainder = &self.remainder[c.len_utf8()..];
        Ok(())
    }

    /// Takes the command, joining `UID` and `AUTHENTICATE` with the command
    /// word that follows them.
    pub(crate) fn take_command(&mut self) -> Result<String> {
        let command = self.take_element(CharClass::Command)?;

        if is_status_command(command) {
            self.status_response = true;
            self.split_human_readable();
        }

        if COMPOUND_COMMANDS
            .iter()
            .any(|compound| compound.eq_ignore_ascii_case(command))
        {
            self.take_space()?;
            let subcommand = self.take_element(CharClass::Command)?;
            return Ok(format!("{command} {subcommand}"));
        }

        Ok(command.to_string())
    }

    /// Keeps only a leading ` [...]` response code as the remainder and stores
    /// the rest of the line as human-readable text.
    fn split_human_readable(&mut self) {
        let (code, text) = match response_code_len(self.remainder) {
            Some(len) => self.remainder.split_at(len),
            None => ("", self.remainder),
        };

        let text = text.trim();
        if !text.is_empty() {
            self.human_readable = Some(text.to_string());
        }
        self.remainder = code;
    }

    /// Parses the remainder into attributes.
    pub(crate) fn take_attributes(&mut self, options: Options) -> Result<Vec<Attribute>> {
        if self.remainder.is_empty() {
            return Err(Error::UnexpectedEndOfInput { position: self.pos });
        }
        if self.remainder.starts_with(char::is_whitespace) {
            return Err(Error::UnexpectedWhitespace { position: self.pos });
        }

        let context = Context {
            status_response: self.status_response,
        };
        let tree = tree::build(self.remainder, self.pos, context, options)?;
        self.pos += self.remainder.chars().count();
        self.remainder = "";
        flatten(&tree)
    }
}

/// Returns the byte length of a leading ` [...]` run of response code groups.
///
/// Equivalent to the pattern `^ \[(?:[^\]]*\])+`: the run extends to the
/// last `]` of the input.
fn response_code_len(remainder: &str) -> Option<usize> {
    let body = remainder.strip_prefix(" [")?;
    body.rfind(']').map(|close| 2 + close + 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_and_command() {
        let mut tokenizer = LineTokenizer::new("A001 FETCH 1");
        assert_eq!(tokenizer.take_tag().unwrap(), "A001");
        tokenizer.take_space().unwrap();
        assert_eq!(tokenizer.take_command().unwrap(), "FETCH");
        assert_eq!(tokenizer.remainder(), " 1");
        assert_eq!(tokenizer.pos, 10);
    }

    #[test]
    fn test_untagged_and_continuation_tags() {
        assert_eq!(LineTokenizer::new("* OK").take_tag().unwrap(), "*");
        assert_eq!(LineTokenizer::new("+ go").take_tag().unwrap(), "+");
    }

    #[test]
    fn test_tag_errors() {
        assert_eq!(
            LineTokenizer::new("").take_tag().unwrap_err(),
            Error::UnexpectedEndOfInput { position: 0 }
        );
        assert_eq!(
            LineTokenizer::new(" A1 OK").take_tag().unwrap_err(),
            Error::UnexpectedWhitespace { position: 0 }
        );
        assert_eq!(
            LineTokenizer::new("A(1 OK").take_tag().unwrap_err(),
            Error::UnexpectedChar {
                position: 1,
                found: '('
            }
        );
    }

    #[test]
    fn test_space_errors() {
        let mut tokenizer = LineTokenizer::new("A1");
        tokenizer.take_tag().unwrap();
        assert_eq!(
            tokenizer.take_space().unwrap_err(),
            Error::UnexpectedEndOfInput { position: 2 }
        );

        let mut tokenizer = LineTokenizer::new("A1\tOK");
        tokenizer.take_tag().unwrap();
        assert_eq!(
            tokenizer.take_space().unwrap_err(),
            Error::UnexpectedChar {
                position: 2,
                found: '\t'
            }
        );
    }

    #[test]
    fn test_status_text_split() {
        let mut tokenizer = LineTokenizer::new("A1 OK [READ-WRITE] SELECT completed ");
        tokenizer.take_tag().unwrap();
        tokenizer.take_space().unwrap();
        assert_eq!(tokenizer.take_command().unwrap(), "OK");
        assert_eq!(tokenizer.remainder(), " [READ-WRITE]");
        assert_eq!(
            tokenizer.take_human_readable().as_deref(),
            Some("SELECT completed")
        );
    }

    #[test]
    fn test_status_without_code() {
        let mut tokenizer = LineTokenizer::new("* BYE  server shutting down");
        tokenizer.take_tag().unwrap();
        tokenizer.take_space().unwrap();
        assert_eq!(tokenizer.take_command().unwrap(), "BYE");
        assert_eq!(tokenizer.remainder(), "");
        assert_eq!(
            tokenizer.take_human_readable().as_deref(),
            Some("server shutting down")
        );
    }

    #[test]
    fn test_compound_command() {
        let mut tokenizer = LineTokenizer::new("A1 uid FETCH 1:2");
        tokenizer.take_tag().unwrap();
        tokenizer.take_space().unwrap();
        assert_eq!(tokenizer.take_command().unwrap(), "uid FETCH");
        assert_eq!(tokenizer.remainder(), " 1:2");

        let mut tokenizer = LineTokenizer::new("A1 UID");
        tokenizer.take_tag().unwrap();
        tokenizer.take_space().unwrap();
        assert_eq!(
            tokenizer.take_command().unwrap_err(),
            Error::UnexpectedEndOfInput { position: 6 }
        );
    }

    #[test]
    fn test_response_code_len() {
        assert_eq!(response_code_len(" [ALERT] text"), Some(8));
        assert_eq!(response_code_len(" [A] [B] text"), Some(8));
        assert_eq!(response_code_len(" [A] text [B] more"), Some(13));
        assert_eq!(response_code_len(" [unclosed"), None);
        assert_eq!(response_code_len("[ALERT]"), None);
        assert_eq!(response_code_len(" text"), None);
    }
}
