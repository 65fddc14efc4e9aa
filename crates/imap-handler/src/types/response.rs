//! Parsed response line.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::attribute::{Attribute, write_separated};

/// Status response keywords that carry an optional response code and
/// human-readable text.
pub const STATUS_RESPONSES: [&str; 5] = ["OK", "NO", "BAD", "PREAUTH", "BYE"];

/// Returns true if `command` is a status response keyword (case-insensitive).
#[must_use]
pub fn is_status_command(command: &str) -> bool {
    STATUS_RESPONSES
        .iter()
        .any(|status| status.eq_ignore_ascii_case(command))
}

/// A parsed server response line.
///
/// The parser does not interpret what the attributes mean for a given
/// command; it only exposes their syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Response {
    /// Command tag, `*` for untagged data, `+` for continuations.
    pub tag: String,
    /// Command or status keyword, e.g. `OK`, `FETCH` or `UID FETCH`.
    pub command: String,
    /// Attributes in document order.
    pub attributes: Vec<Attribute>,
}

impl Response {
    /// Returns true for untagged (`*`) responses.
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        self.tag == "*"
    }

    /// Returns true for continuation (`+`) responses.
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        self.tag == "+"
    }

    /// Returns true if the command is OK, NO, BAD, PREAUTH or BYE.
    #[must_use]
    pub fn is_status(&self) -> bool {
        is_status_command(&self.command)
    }

    /// Returns the human-readable text of a status response.
    #[must_use]
    pub fn human_readable(&self) -> Option<&str> {
        match self.attributes.last() {
            Some(Attribute::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns the first bracketed response code of a status response.
    ///
    /// See [`Response::response_codes`] for lines carrying several codes.
    #[must_use]
    pub fn response_code(&self) -> Option<&[Attribute]> {
        self.response_codes().next()
    }

    /// Returns every bracketed response code of a status response, in
    /// order, as in `* OK [ALERT] [PARSE] text`.
    pub fn response_codes(&self) -> impl Iterator<Item = &[Attribute]> {
        let status = self.is_status();
        self.attributes
            .iter()
            .filter(move |_| status)
            .filter_map(|attribute| match attribute {
                Attribute::Atom {
                    value,
                    section: Some(section),
                    ..
                } if value.is_empty() => Some(section.as_slice()),
                _ => None,
            })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag, self.command)?;
        if !self.attributes.is_empty() {
            f.write_str(" ")?;
            write_separated(f, &self.attributes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use super::*;

    fn status(code: Option<Vec<Attribute>>, text: Option<&str>) -> Response {
        let mut attributes = Vec::new();
        if let Some(code) = code {
            attributes.push(Attribute::atom_with_section("", code));
        }
        if let Some(text) = text {
            attributes.push(Attribute::text(text));
        }
        Response {
            tag: "A1".to_string(),
            command: "OK".to_string(),
            attributes,
        }
    }

    #[test]
    fn test_is_status_command() {
        assert!(is_status_command("OK"));
        assert!(is_status_command("preauth"));
        assert!(is_status_command("Bye"));
        assert!(!is_status_command("FETCH"));
        assert!(!is_status_command("OKAY"));
    }

    #[test]
    fn test_tag_kinds() {
        let mut response = status(None, None);
        assert!(!response.is_untagged());
        response.tag = "*".to_string();
        assert!(response.is_untagged());
        response.tag = "+".to_string();
        assert!(response.is_continuation());
    }

    #[test]
    fn test_human_readable_and_code() {
        let response = status(
            Some(vec![Attribute::atom("READ-WRITE")]),
            Some("SELECT completed"),
        );
        assert_eq!(response.human_readable(), Some("SELECT completed"));
        assert_eq!(
            response.response_code(),
            Some(&[Attribute::atom("READ-WRITE")][..])
        );

        let bare = status(None, None);
        assert_eq!(bare.human_readable(), None);
        assert_eq!(bare.response_code(), None);
    }

    #[test]
    fn test_several_response_codes() {
        let mut response = status(Some(vec![Attribute::atom("ALERT")]), None);
        response
            .attributes
            .push(Attribute::atom_with_section("", vec![Attribute::atom("PARSE")]));
        response.attributes.push(Attribute::text("text"));

        let codes: Vec<_> = response.response_codes().collect();
        assert_eq!(
            codes,
            vec![&[Attribute::atom("ALERT")][..], &[Attribute::atom("PARSE")][..]]
        );
        assert_eq!(response.response_code(), Some(&[Attribute::atom("ALERT")][..]));

        response.command = "FETCH".to_string();
        assert_eq!(response.response_codes().count(), 0);
    }

    #[test]
    fn test_display() {
        let response = status(
            Some(vec![Attribute::atom("UIDNEXT"), Attribute::atom("4392")]),
            Some("Predicted next UID"),
        );
        assert_eq!(
            response.to_string(),
            "A1 OK [UIDNEXT 4392] Predicted next UID"
        );

        let bare = status(None, None);
        assert_eq!(bare.to_string(), "A1 OK");
    }
}
