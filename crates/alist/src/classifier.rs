//! Byte classification tables.
//!
//! A [`Grammar`] names the delimiter bytes of the format; a
//! [`CharClassifier`] turns it into a 256-entry lookup table so every
//! classification the parser makes is a single index operation. Tables are
//! built by a `const fn`, which lets the table for [`Grammar::DEFAULT`] live in
//! a `static` shared by every parser that uses the default grammar.

use core::fmt;

use crate::error::GrammarError;

/// How a backslash followed by a byte without a defined meaning is decoded
/// inside a quoted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownEscape {
    /// Append the byte after the backslash and drop the backslash, so `\q`
    /// decodes to `q`.
    #[default]
    Verbatim,
    /// Append a literal backslash and scan the following byte normally, so
    /// `\q` decodes to `\q`. Escaped backslashes and quotes still decode to
    /// the bare byte.
    KeepBackslash,
}

/// The delimiter configuration of the format.
///
/// Every byte may take at most one role. `open` and `close` are paired by
/// position: `open[i]` is closed only by `close[i]`. Each byte of `quotes` is
/// an independent quote variant that must be closed by the same byte.
///
/// # Examples
///
/// ```rust
/// use alist::{CharClassifier, Grammar};
///
/// let grammar = Grammar {
///     open: b"(",
///     close: b")",
///     ..Grammar::DEFAULT
/// };
/// let classifier = CharClassifier::new(&grammar).unwrap();
/// assert_eq!(classifier.open_variant(b'('), Some(0));
/// assert_eq!(classifier.open_variant(b'['), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grammar<'a> {
    /// Bytes skipped between tokens.
    pub whitespace: &'a [u8],
    /// Bytes that start a comment running to the end of the buffered input.
    pub comment: &'a [u8],
    /// Bytes separating the members of a list.
    pub item_separator: &'a [u8],
    /// Bytes separating a key from its value.
    pub kv_separator: &'a [u8],
    /// Quote bytes, one variant each.
    pub quotes: &'a [u8],
    /// Open bracket bytes, one variant each.
    pub open: &'a [u8],
    /// Close bracket bytes, paired positionally with `open`.
    pub close: &'a [u8],
    /// Decoding policy for escapes without a defined meaning.
    pub unknown_escape: UnknownEscape,
}

impl Grammar<'static> {
    /// The standard alist grammar: space and tab whitespace, `#` comments, `,`
    /// between items, `:` or `=` between key and value, `'` and `"` quotes,
    /// and `[...]` / `{...}` lists.
    pub const DEFAULT: Self = Self {
        whitespace: b" \t",
        comment: b"#",
        item_separator: b",",
        kv_separator: b":=",
        quotes: b"'\"",
        open: b"[{",
        close: b"]}",
        unknown_escape: UnknownEscape::Verbatim,
    };
}

impl Default for Grammar<'static> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The role of a single byte. Variant indexes tie quote and bracket bytes to
/// their position in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// Part of a bare literal.
    Plain,
    /// Skipped between tokens.
    Whitespace,
    /// Starts a comment.
    Comment,
    /// Separates list members.
    ItemSeparator,
    /// Separates a key from its value.
    KvSeparator,
    /// Opens or closes a string of the given quote variant.
    Quote(u8),
    /// Opens a list of the given bracket variant.
    Open(u8),
    /// Closes a list of the given bracket variant.
    Close(u8),
}

impl Class {
    /// Whether the byte ends a bare literal.
    #[must_use]
    #[inline]
    pub const fn is_boundary(self) -> bool {
        !matches!(self, Class::Plain)
    }
}

#[derive(Clone, Copy)]
enum Role {
    Whitespace,
    Comment,
    ItemSeparator,
    KvSeparator,
    Quote,
    Open,
    Close,
}

impl Role {
    const fn class(self, variant: u8) -> Class {
        match self {
            Role::Whitespace => Class::Whitespace,
            Role::Comment => Class::Comment,
            Role::ItemSeparator => Class::ItemSeparator,
            Role::KvSeparator => Class::KvSeparator,
            Role::Quote => Class::Quote(variant),
            Role::Open => Class::Open(variant),
            Role::Close => Class::Close(variant),
        }
    }
}

static STANDARD: CharClassifier = match CharClassifier::new(&Grammar::DEFAULT) {
    Ok(classifier) => classifier,
    Err(_) => panic!("the default grammar assigns one role per byte"),
};

/// Lookup tables answering, for any byte, which role it plays in a grammar.
#[derive(Clone, PartialEq, Eq)]
pub struct CharClassifier {
    table: [Class; 256],
    unknown_escape: UnknownEscape,
}

impl CharClassifier {
    /// Build the tables for `grammar`.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] if `open` and `close` differ in length, if a
    /// byte is listed more than once, or if the escape byte `\` is used as a
    /// delimiter.
    pub const fn new(grammar: &Grammar<'_>) -> Result<Self, GrammarError> {
        if grammar.open.len() != grammar.close.len() {
            return Err(GrammarError::MismatchedBrackets {
                open: grammar.open.len(),
                close: grammar.close.len(),
            });
        }

        let roles: [(&[u8], Role); 7] = [
            (grammar.whitespace, Role::Whitespace),
            (grammar.comment, Role::Comment),
            (grammar.item_separator, Role::ItemSeparator),
            (grammar.kv_separator, Role::KvSeparator),
            (grammar.quotes, Role::Quote),
            (grammar.open, Role::Open),
            (grammar.close, Role::Close),
        ];

        let mut table = [Class::Plain; 256];
        let mut r = 0;
        while r < roles.len() {
            table = match assign(table, roles[r].0, roles[r].1) {
                Ok(table) => table,
                Err(err) => return Err(err),
            };
            r += 1;
        }

        Ok(Self {
            table,
            unknown_escape: grammar.unknown_escape,
        })
    }

    /// The shared classifier for [`Grammar::DEFAULT`].
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// The role of `b`.
    #[must_use]
    #[inline]
    pub fn class(&self, b: u8) -> Class {
        self.table[usize::from(b)]
    }

    /// Whether `b` is skipped between tokens.
    #[must_use]
    #[inline]
    pub fn is_whitespace(&self, b: u8) -> bool {
        matches!(self.class(b), Class::Whitespace)
    }

    /// Whether `b` starts a comment.
    #[must_use]
    #[inline]
    pub fn is_comment(&self, b: u8) -> bool {
        matches!(self.class(b), Class::Comment)
    }

    /// Whether `b` separates list members.
    #[must_use]
    #[inline]
    pub fn is_item_separator(&self, b: u8) -> bool {
        matches!(self.class(b), Class::ItemSeparator)
    }

    /// Whether `b` separates a key from its value.
    #[must_use]
    #[inline]
    pub fn is_kv_separator(&self, b: u8) -> bool {
        matches!(self.class(b), Class::KvSeparator)
    }

    /// The quote variant `b` opens and closes, if it is a quote.
    #[must_use]
    #[inline]
    pub fn quote_variant(&self, b: u8) -> Option<u8> {
        match self.class(b) {
            Class::Quote(variant) => Some(variant),
            _ => None,
        }
    }

    /// The bracket variant `b` opens, if it is an open bracket.
    #[must_use]
    #[inline]
    pub fn open_variant(&self, b: u8) -> Option<u8> {
        match self.class(b) {
            Class::Open(variant) => Some(variant),
            _ => None,
        }
    }

    /// The bracket variant `b` closes, if it is a close bracket.
    #[must_use]
    #[inline]
    pub fn close_variant(&self, b: u8) -> Option<u8> {
        match self.class(b) {
            Class::Close(variant) => Some(variant),
            _ => None,
        }
    }

    /// Whether `b` ends a bare literal: the union of every delimiter role.
    #[must_use]
    #[inline]
    pub fn is_boundary(&self, b: u8) -> bool {
        self.class(b).is_boundary()
    }

    /// The decoding policy for escapes without a defined meaning.
    #[must_use]
    pub fn unknown_escape(&self) -> UnknownEscape {
        self.unknown_escape
    }

    /// Index of the first non-whitespace byte of `buf` at or after `from`.
    pub(crate) fn skip_whitespace(&self, buf: &[u8], from: usize) -> usize {
        buf[from..]
            .iter()
            .position(|&b| !self.is_whitespace(b))
            .map_or(buf.len(), |i| from + i)
    }

    /// Index of the first boundary byte of `buf` at or after `from`.
    pub(crate) fn literal_end(&self, buf: &[u8], from: usize) -> usize {
        buf[from..]
            .iter()
            .position(|&b| self.is_boundary(b))
            .map_or(buf.len(), |i| from + i)
    }

    /// Index of the first backslash or closing quote of `variant` in `buf` at
    /// or after `from`.
    pub(crate) fn string_stop(&self, buf: &[u8], from: usize, variant: u8) -> usize {
        buf[from..]
            .iter()
            .position(|&b| b == b'\\' || self.quote_variant(b) == Some(variant))
            .map_or(buf.len(), |i| from + i)
    }
}

impl Default for CharClassifier {
    fn default() -> Self {
        STANDARD.clone()
    }
}

impl fmt::Debug for CharClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delimiters = self.table.iter().filter(|class| class.is_boundary()).count();
        f.debug_struct("CharClassifier")
            .field("delimiters", &delimiters)
            .field("unknown_escape", &self.unknown_escape)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn assign(
    mut table: [Class; 256],
    bytes: &[u8],
    role: Role,
) -> Result<[Class; 256], GrammarError> {
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            return Err(GrammarError::ReservedByte(b));
        }
        if !matches!(table[b as usize], Class::Plain) {
            return Err(GrammarError::ConflictingRole(b));
        }
        // A byte takes one role, so no list is longer than 255 entries here.
        table[b as usize] = role.class(i as u8);
        i += 1;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_roles() {
        let c = CharClassifier::standard();
        assert!(c.is_whitespace(b' '));
        assert!(c.is_whitespace(b'\t'));
        assert!(!c.is_whitespace(b'\n'));
        assert!(c.is_comment(b'#'));
        assert!(c.is_item_separator(b','));
        assert!(c.is_kv_separator(b':'));
        assert!(c.is_kv_separator(b'='));
        assert_eq!(c.quote_variant(b'\''), Some(0));
        assert_eq!(c.quote_variant(b'"'), Some(1));
        assert_eq!(c.open_variant(b'['), Some(0));
        assert_eq!(c.open_variant(b'{'), Some(1));
        assert_eq!(c.close_variant(b']'), Some(0));
        assert_eq!(c.close_variant(b'}'), Some(1));
        assert_eq!(c.unknown_escape(), UnknownEscape::Verbatim);
    }

    #[test]
    fn boundary_is_union_of_roles() {
        let c = CharClassifier::standard();
        let boundary: alloc::vec::Vec<u8> = (0..=255u8).filter(|&b| c.is_boundary(b)).collect();
        assert_eq!(boundary, b"\t \"#',:=[]{}".to_vec());
        assert!(!c.is_boundary(b'\\'));
        assert!(!c.is_boundary(b'\n'));
        assert!(!c.is_boundary(0xff));
    }

    #[test]
    fn scanning_helpers() {
        let c = CharClassifier::standard();
        assert_eq!(c.skip_whitespace(b"  \tx", 0), 3);
        assert_eq!(c.skip_whitespace(b"   ", 1), 3);
        assert_eq!(c.literal_end(b"abc,def", 0), 3);
        assert_eq!(c.literal_end(b"abc", 1), 3);
        assert_eq!(c.string_stop(b"ab\"c'", 0, 0), 4);
        assert_eq!(c.string_stop(b"ab\\'", 0, 0), 2);
        assert_eq!(c.string_stop(b"abc", 0, 1), 3);
    }

    #[test]
    fn mismatched_brackets_rejected() {
        let grammar = Grammar {
            open: b"[{(",
            ..Grammar::DEFAULT
        };
        assert_eq!(
            CharClassifier::new(&grammar),
            Err(GrammarError::MismatchedBrackets { open: 3, close: 2 })
        );
    }

    #[test]
    fn conflicting_roles_rejected() {
        let grammar = Grammar {
            item_separator: b",;",
            kv_separator: b";",
            ..Grammar::DEFAULT
        };
        assert_eq!(CharClassifier::new(&grammar), Err(GrammarError::ConflictingRole(b';')));

        let duplicated = Grammar {
            quotes: b"''",
            ..Grammar::DEFAULT
        };
        assert_eq!(CharClassifier::new(&duplicated), Err(GrammarError::ConflictingRole(b'\'')));
    }

    #[test]
    fn backslash_is_reserved() {
        let grammar = Grammar {
            comment: b"\\",
            ..Grammar::DEFAULT
        };
        assert_eq!(CharClassifier::new(&grammar), Err(GrammarError::ReservedByte(b'\\')));
    }
}
