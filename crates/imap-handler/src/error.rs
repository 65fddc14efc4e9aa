//! Error types for the IMAP response parser.

use thiserror::Error;

/// Errors that can occur while parsing a response line.
///
/// Every variant carries the character offset into the input line where the
/// problem was detected. The first error aborts the whole parse; no partial
/// response is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Whitespace where a token was expected.
    #[error("Unexpected whitespace at position {position}")]
    UnexpectedWhitespace {
        /// Character position where the error occurred.
        position: usize,
    },

    /// A character not allowed by the grammar at this point.
    #[error("Unexpected char {found:?} at position {position}")]
    UnexpectedChar {
        /// Character position where the error occurred.
        position: usize,
        /// The offending character.
        found: char,
    },

    /// Input ended while a token or composite was still open.
    #[error("Unexpected end of input at position {position}")]
    UnexpectedEndOfInput {
        /// Character position where more input was expected.
        position: usize,
    },

    /// A `)` or `]` that does not close the current list or section.
    #[error("Unexpected terminator {terminator:?} at position {position}")]
    UnexpectedTerminator {
        /// Character position where the error occurred.
        position: usize,
        /// The terminator that was found.
        terminator: char,
    },

    /// Malformed `<start.end>` partial range.
    #[error("Invalid partial at position {position}")]
    InvalidPartial {
        /// Character position where the error occurred.
        position: usize,
    },

    /// Malformed `{n}` literal length.
    #[error("Invalid literal length at position {position}")]
    InvalidLiteralLength {
        /// Character position where the error occurred.
        position: usize,
    },

    /// A `[` following an atom that cannot carry a section.
    #[error("Unexpected section start at position {position}")]
    UnexpectedSectionStart {
        /// Character position where the error occurred.
        position: usize,
    },
}

impl Error {
    /// Returns the character position where the error was detected.
    #[must_use]
    pub const fn position(&self) -> usize {
        match *self {
            Self::UnexpectedWhitespace { position }
            | Self::UnexpectedChar { position, .. }
            | Self::UnexpectedEndOfInput { position }
            | Self::UnexpectedTerminator { position, .. }
            | Self::InvalidPartial { position }
            | Self::InvalidLiteralLength { position }
            | Self::UnexpectedSectionStart { position } => position,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        assert_eq!(Error::UnexpectedWhitespace { position: 3 }.position(), 3);
        assert_eq!(
            Error::UnexpectedChar {
                position: 7,
                found: '('
            }
            .position(),
            7
        );
        assert_eq!(Error::InvalidPartial { position: 12 }.position(), 12);
    }

    #[test]
    fn test_display() {
        let err = Error::UnexpectedChar {
            position: 4,
            found: '{',
        };
        assert_eq!(err.to_string(), "Unexpected char '{' at position 4");

        let err = Error::UnexpectedEndOfInput { position: 10 };
        assert_eq!(err.to_string(), "Unexpected end of input at position 10");
    }
}
