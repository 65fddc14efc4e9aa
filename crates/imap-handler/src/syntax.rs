//! IMAP formal syntax character classes.
//!
//! Pure membership tests for the grammar classes of RFC 3501 section 9 that
//! the parser needs. Everything here is a function of its arguments only, so
//! it is safe to call from any number of parsers at once.

/// Grammar classes the line tokenizer validates whole tokens against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// A single space.
    Sp,
    /// `0`-`9`.
    Digit,
    /// Response tag: `tag` plus the `*` (untagged) and `+` (continuation)
    /// markers.
    ResponseTag,
    /// Command or status keyword: letters and digits.
    Command,
    /// Any `ATOM-CHAR`.
    Atom,
}

impl CharClass {
    /// Returns true if `c` belongs to this class.
    #[must_use]
    pub const fn contains(self, c: char) -> bool {
        match self {
            Self::Sp => c == ' ',
            Self::Digit => c.is_ascii_digit(),
            Self::ResponseTag => is_tag_char(c) || c == '*' || c == '+',
            Self::Command => c.is_ascii_alphanumeric(),
            Self::Atom => is_atom_char(c),
        }
    }
}

/// Returns the character index and value of the first character of `token`
/// outside `class`, or `None` if every character is allowed.
#[must_use]
pub fn verify(token: &str, class: CharClass) -> Option<(usize, char)> {
    token.chars().enumerate().find(|&(_, c)| !class.contains(c))
}

/// Returns true for `CHAR`: any 7-bit character except NUL.
#[must_use]
pub const fn is_char(c: char) -> bool {
    matches!(c, '\x01'..='\x7f')
}

/// Returns true for `CTL`: control characters and DEL.
#[must_use]
pub const fn is_ctl(c: char) -> bool {
    matches!(c, '\x00'..='\x1f' | '\x7f')
}

/// Returns true if the character is an atom special character.
#[must_use]
pub const fn is_atom_special(c: char) -> bool {
    // atom-specials = "(" / ")" / "{" / SP / CTL / list-wildcards /
    //                 quoted-specials / resp-specials
    matches!(c, '(' | ')' | '{' | ' ' | '%' | '*' | '"' | '\\' | ']') || is_ctl(c)
}

/// Returns true if the character is a valid `ATOM-CHAR`.
///
/// Unlike a lexer that folds flags into atoms, `\` is not an atom char here;
/// the tree builder admits it explicitly as the first character of a token.
#[must_use]
pub const fn is_atom_char(c: char) -> bool {
    is_char(c) && !is_atom_special(c)
}

/// Returns true for `ASTRING-CHAR`: `ATOM-CHAR` or `]`.
#[must_use]
pub const fn is_astring_char(c: char) -> bool {
    is_atom_char(c) || c == ']'
}

/// Returns true for characters allowed in a `tag`: `ASTRING-CHAR` except `+`.
#[must_use]
pub const fn is_tag_char(c: char) -> bool {
    is_astring_char(c) && c != '+'
}
