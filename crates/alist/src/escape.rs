//! Decoding of backslash escapes inside quoted strings.
//!
//! [`decode`] looks at the bytes following a backslash and reports what to
//! append and how far to advance. It never consumes input itself, so a
//! directive split across chunks is simply decoded again once more bytes
//! arrive.
//!
//! | directive | decodes to                |
//! |-----------|---------------------------|
//! | `n`       | line feed                 |
//! | `t`       | horizontal tab            |
//! | `r`       | carriage return           |
//! | `f`       | form feed                 |
//! | `xHH`     | the byte `0xHH`           |
//! | `\`, quote| the byte itself           |
//! | other     | per [`UnknownEscape`]     |

use crate::{CharClassifier, SyntaxError, UnknownEscape};

/// The outcome of decoding one escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escape {
    /// Append `byte`, skipping `len` directive bytes after the backslash.
    Byte { byte: u8, len: usize },
    /// Append the backslash itself and scan the directive byte as content.
    Backslash,
    /// Too few bytes are buffered to decide.
    Incomplete,
}

#[inline]
fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode the escape whose directive starts at `directive[0]`.
///
/// With `closed` set no further input will arrive, so a truncated `\x`
/// directive is an error instead of [`Escape::Incomplete`].
pub(crate) fn decode(
    directive: &[u8],
    classifier: &CharClassifier,
    closed: bool,
) -> Result<Escape, SyntaxError> {
    let Some(&first) = directive.first() else {
        return Ok(Escape::Incomplete);
    };

    let byte = match first {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'f' => 0x0c,
        b'x' => return decode_hex(&directive[1..], closed),
        b'\\' => b'\\',
        quote if classifier.quote_variant(quote).is_some() => quote,
        other => match classifier.unknown_escape() {
            UnknownEscape::Verbatim => other,
            UnknownEscape::KeepBackslash => return Ok(Escape::Backslash),
        },
    };
    Ok(Escape::Byte { byte, len: 1 })
}

fn decode_hex(digits: &[u8], closed: bool) -> Result<Escape, SyntaxError> {
    let mut acc = 0u8;
    for &d in digits.iter().take(2) {
        acc = (acc << 4) | hex_val(d).ok_or(SyntaxError::MalformedEscape)?;
    }

    if digits.len() < 2 {
        return if closed {
            Err(SyntaxError::MalformedEscape)
        } else {
            Ok(Escape::Incomplete)
        };
    }

    Ok(Escape::Byte { byte: acc, len: 3 })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::Grammar;

    fn standard(directive: &[u8]) -> Result<Escape, SyntaxError> {
        decode(directive, CharClassifier::standard(), false)
    }

    #[rstest]
    #[case(b"n", 0x0a)]
    #[case(b"t", 0x09)]
    #[case(b"r", 0x0d)]
    #[case(b"f", 0x0c)]
    #[case(b"\\", b'\\')]
    #[case(b"'", b'\'')]
    #[case(b"\"", b'"')]
    #[case(b"q", b'q')]
    #[case(b"nabc", 0x0a)]
    fn single_byte_directives(#[case] directive: &[u8], #[case] expected: u8) {
        assert_eq!(
            standard(directive),
            Ok(Escape::Byte {
                byte: expected,
                len: 1
            })
        );
    }

    #[rstest]
    #[case(b"x41", 0x41)]
    #[case(b"xff", 0xff)]
    #[case(b"xAb", 0xab)]
    #[case(b"x00rest", 0x00)]
    fn hex_directives(#[case] directive: &[u8], #[case] expected: u8) {
        assert_eq!(
            standard(directive),
            Ok(Escape::Byte {
                byte: expected,
                len: 3
            })
        );
    }

    #[test]
    fn truncated_directives_wait_for_more_input() {
        assert_eq!(standard(b""), Ok(Escape::Incomplete));
        assert_eq!(standard(b"x"), Ok(Escape::Incomplete));
        assert_eq!(standard(b"x4"), Ok(Escape::Incomplete));
    }

    #[test]
    fn truncated_hex_fails_once_input_is_closed() {
        let c = CharClassifier::standard();
        assert_eq!(decode(b"x4", c, true), Err(SyntaxError::MalformedEscape));
        assert_eq!(decode(b"x", c, true), Err(SyntaxError::MalformedEscape));
        // A lone backslash is left for the caller to treat as truncation.
        assert_eq!(decode(b"", c, true), Ok(Escape::Incomplete));
    }

    #[test]
    fn non_hex_digit_is_malformed() {
        assert_eq!(standard(b"xg0"), Err(SyntaxError::MalformedEscape));
        assert_eq!(standard(b"x4'"), Err(SyntaxError::MalformedEscape));
        assert_eq!(standard(b"xz"), Err(SyntaxError::MalformedEscape));
    }

    #[test]
    fn keep_backslash_policy() {
        let grammar = Grammar {
            unknown_escape: UnknownEscape::KeepBackslash,
            ..Grammar::DEFAULT
        };
        let c = CharClassifier::new(&grammar).unwrap();
        assert_eq!(decode(b"q", &c, false), Ok(Escape::Backslash));
        assert_eq!(decode(b"n", &c, false), Ok(Escape::Byte { byte: b'\n', len: 1 }));
        assert_eq!(decode(b"\\", &c, false), Ok(Escape::Byte { byte: b'\\', len: 1 }));
        assert_eq!(decode(b"'", &c, false), Ok(Escape::Byte { byte: b'\'', len: 1 }));
    }
}
