use thiserror::Error;

/// A syntax error raised while driving the parser, located by the absolute
/// byte offset of the offending input byte from the start of the stream.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at byte {offset}")]
pub struct ParserError {
    pub(crate) kind: SyntaxError,
    pub(crate) offset: usize,
}

impl ParserError {
    pub(crate) fn new(kind: SyntaxError, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> SyntaxError {
        self.kind
    }

    /// Offset of the offending byte, counted over every byte fed so far.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// The kinds of syntax error the parser reports.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// A byte that cannot begin an element: an item separator, a close
    /// bracket where no element may end, or a close bracket of the wrong
    /// variant.
    #[error("unexpected character '{}' at element start", .0.escape_ascii())]
    UnexpectedCharAtElementStart(u8),
    /// A key/value separator with no preceding element in the list.
    #[error("missing key before key/value separator")]
    MissingKeyBeforeSeparator,
    /// A key/value separator after a list element; keys must be literals or
    /// strings.
    #[error("invalid key type: keys must be literals or strings")]
    InvalidKeyType,
    /// A key/value separator where an element was expected.
    #[error("unexpected key/value separator '{}'", .0.escape_ascii())]
    UnexpectedSeparator(u8),
    /// `\x` not followed by two hexadecimal digits.
    #[error("malformed escape: expected two hex digits after \\x")]
    MalformedEscape,
    /// The frame stack does not match what the current state requires.
    #[error("invalid parser state: {0}")]
    InvalidParserState(&'static str),
    /// The input was sealed inside an open element.
    #[error("input ended inside an unterminated element")]
    UnterminatedInput,
}

/// Why a [`Grammar`](crate::Grammar) cannot be turned into a classifier.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GrammarError {
    /// `open` and `close` must pair up one to one.
    #[error("{open} open brackets but {close} close brackets")]
    MismatchedBrackets {
        /// Number of open bracket bytes.
        open: usize,
        /// Number of close bracket bytes.
        close: usize,
    },
    /// The byte is listed under more than one role, or twice under one.
    #[error("byte '{}' is assigned more than one role", .0.escape_ascii())]
    ConflictingRole(u8),
    /// The byte is reserved for escape sequences.
    #[error("byte '{}' is reserved for escape sequences", .0.escape_ascii())]
    ReservedByte(u8),
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_kind_and_offset() {
        let err = ParserError::new(SyntaxError::UnexpectedCharAtElementStart(b']'), 7);
        assert_eq!(err.to_string(), "unexpected character ']' at element start at byte 7");
        assert_eq!(err.kind(), SyntaxError::UnexpectedCharAtElementStart(b']'));
        assert_eq!(err.offset(), 7);
    }

    #[test]
    fn non_printable_bytes_are_escaped() {
        let err = SyntaxError::UnexpectedSeparator(0x01);
        assert_eq!(err.to_string(), "unexpected key/value separator '\\x01'");
    }
}
