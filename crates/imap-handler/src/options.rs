//! Parser configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options controlling how a response line is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Options {
    /// Accept non-synchronizing `{n+}` literal announcements (RFC 7888).
    pub literal_plus: bool,
}

impl Options {
    /// Creates the default options: strict literals only.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            literal_plus: false,
        }
    }

    /// Sets whether `{n+}` literals are accepted.
    #[must_use]
    pub const fn literal_plus(mut self, enabled: bool) -> Self {
        self.literal_plus = enabled;
        self
    }
}
