//! Typed attributes produced by the parser.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A `<start.end>` partial range attached after a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Partial {
    /// First bound.
    pub start: u64,
    /// Second bound, absent for the single-number form `<start>`.
    pub end: Option<u64>,
}

impl Partial {
    /// Creates a partial with both bounds.
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Creates a partial with only the first bound.
    #[must_use]
    pub const fn origin(start: u64) -> Self {
        Self { start, end: None }
    }
}

impl fmt::Display for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "<{}.{end}>", self.start),
            None => write!(f, "<{}>", self.start),
        }
    }
}

/// One element of a parsed response.
///
/// Attributes form a tree: lists nest further attributes, and an atom may
/// carry a `[section]` of attributes and a `<partial>` range. Sections and
/// partials only ever follow atoms (`BODY[...]`, `BODY.PEEK[...]`, or the
/// empty atom standing for a status response code).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Attribute {
    /// Human-readable trailer of a status response.
    Text(String),
    /// Bare token.
    Atom {
        /// Token text, case preserved.
        value: String,
        /// Bracketed section following the token.
        section: Option<Vec<Attribute>>,
        /// Partial range following the section.
        partial: Option<Partial>,
    },
    /// `NIL`.
    Null,
    /// Quoted string with escapes removed.
    QuotedString(String),
    /// Literal payload, exactly as many characters as announced.
    Literal(String),
    /// Sequence set text such as `1:5,7,9:*`.
    SequenceSet(String),
    /// Parenthesized list.
    List(Vec<Attribute>),
}

impl Attribute {
    /// Creates a bare atom.
    #[must_use]
    pub fn atom(value: impl Into<String>) -> Self {
        Self::Atom {
            value: value.into(),
            section: None,
            partial: None,
        }
    }

    /// Creates an atom carrying a section.
    #[must_use]
    pub fn atom_with_section(value: impl Into<String>, section: Vec<Self>) -> Self {
        Self::Atom {
            value: value.into(),
            section: Some(section),
            partial: None,
        }
    }

    /// Creates a quoted string.
    #[must_use]
    pub fn quoted(value: impl Into<String>) -> Self {
        Self::QuotedString(value.into())
    }

    /// Creates a literal.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates a sequence set.
    #[must_use]
    pub fn sequence_set(value: impl Into<String>) -> Self {
        Self::SequenceSet(value.into())
    }

    /// Creates a trailing text attribute.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates a list.
    #[must_use]
    pub const fn list(items: Vec<Self>) -> Self {
        Self::List(items)
    }

    /// Returns the textual value of any scalar attribute.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s)
            | Self::QuotedString(s)
            | Self::Literal(s)
            | Self::SequenceSet(s)
            | Self::Atom { value: s, .. } => Some(s),
            Self::Null | Self::List(_) => None,
        }
    }

    /// Returns true for `NIL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the items of a list.
    #[must_use]
    pub fn items(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the section attached to an atom.
    #[must_use]
    pub fn section(&self) -> Option<&[Self]> {
        match self {
            Self::Atom {
                section: Some(section),
                ..
            } => Some(section),
            _ => None,
        }
    }

    /// Returns the partial range attached to an atom.
    #[must_use]
    pub const fn partial(&self) -> Option<Partial> {
        match self {
            Self::Atom { partial, .. } => *partial,
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::SequenceSet(s) => f.write_str(s),
            Self::Null => f.write_str("NIL"),
            Self::QuotedString(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            Self::Literal(s) => write!(f, "{{{}}}\r\n{s}", s.chars().count()),
            Self::List(items) => {
                f.write_str("(")?;
                write_separated(f, items)?;
                f.write_str(")")
            }
            Self::Atom {
                value,
                section,
                partial,
            } => {
                f.write_str(value)?;
                if let Some(section) = section {
                    f.write_str("[")?;
                    write_separated(f, section)?;
                    f.write_str("]")?;
                }
                if let Some(partial) = partial {
                    write!(f, "{partial}")?;
                }
                Ok(())
            }
        }
    }
}

/// Writes attributes separated by single spaces.
pub(crate) fn write_separated(f: &mut fmt::Formatter<'_>, items: &[Attribute]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let atom = Attribute::atom("FLAGS");
        assert_eq!(atom.as_str(), Some("FLAGS"));
        assert!(atom.section().is_none());
        assert!(atom.partial().is_none());

        assert!(Attribute::Null.is_null());
        assert_eq!(Attribute::Null.as_str(), None);

        let list = Attribute::list(vec![Attribute::atom("a"), Attribute::Null]);
        assert_eq!(list.items().unwrap().len(), 2);
        assert_eq!(list.as_str(), None);
    }

    #[test]
    fn test_display_atom_with_section_and_partial() {
        let body = Attribute::Atom {
            value: "BODY".to_string(),
            section: Some(vec![Attribute::atom("HEADER")]),
            partial: Some(Partial::new(0, 1024)),
        };
        assert_eq!(body.to_string(), "BODY[HEADER]<0.1024>");

        let origin = Attribute::Atom {
            value: "BODY".to_string(),
            section: Some(vec![]),
            partial: Some(Partial::origin(5)),
        };
        assert_eq!(origin.to_string(), "BODY[]<5>");
    }

    #[test]
    fn test_display_response_code_atom() {
        let code = Attribute::atom_with_section(
            "",
            vec![Attribute::atom("UIDNEXT"), Attribute::atom("100")],
        );
        assert_eq!(code.to_string(), "[UIDNEXT 100]");
    }

    #[test]
    fn test_display_quoted_escapes() {
        let s = Attribute::quoted("say \"hi\" \\o/");
        assert_eq!(s.to_string(), "\"say \\\"hi\\\" \\\\o/\"");
    }

    #[test]
    fn test_display_literal_counts_chars() {
        assert_eq!(Attribute::literal("héllo").to_string(), "{5}\r\nhéllo");
        assert_eq!(Attribute::literal("").to_string(), "{0}\r\n");
    }

    #[test]
    fn test_display_nested_list() {
        let list = Attribute::list(vec![
            Attribute::atom("FLAGS"),
            Attribute::list(vec![Attribute::atom("\\Seen"), Attribute::Null]),
        ]);
        assert_eq!(list.to_string(), "(FLAGS (\\Seen NIL))");
    }
}
