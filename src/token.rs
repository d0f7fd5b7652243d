use std::fmt;

/// Associates readiness events and descriptor-table entries with the
/// connection that owns them.
///
/// A `Token` is an opaque key into the descriptor table ([`crate::sources::Sources`]);
/// the core never interprets its value, it only round-trips it between
/// registration and the readiness event the facility later hands back.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Token(pub usize);

impl From<usize> for Token {
    fn from(val: usize) -> Token {
        Token(val)
    }
}

impl From<Token> for usize {
    fn from(val: Token) -> usize {
        val.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(fmt)
    }
}
