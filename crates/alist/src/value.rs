//! Owned alist values.
//!
//! [`Value`] is what [`StdBuilder`](crate::StdBuilder) produces.
//! [`Value::to_source`] writes source text in the default grammar that parses
//! back to an equal value. [`Display`](core::fmt::Display) shows the same
//! text, except that a literal holding invalid UTF-8 is shown lossily and so
//! does not parse back to the same bytes.
use alloc::vec::Vec;
use core::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::{CharClassifier, ValueKind};

/// One parsed element.
///
/// # Examples
///
/// ```
/// use alist::Value;
///
/// let values = alist::parse("[a, 'b c', k=v]").unwrap();
/// let Value::AList(list) = &values[0] else { unreachable!() };
/// assert_eq!(list.items[1], Value::String("b c".into()));
/// assert_eq!(list.get("k"), Some(&Value::Literal("v".into())));
/// assert_eq!(values[0].to_string(), r#"[a,"b c",k=v]"#);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A bare literal, exactly as written.
    Literal(BString),
    /// A quoted string with its escapes decoded.
    String(BString),
    /// A bracketed list.
    AList(AList),
}

/// A list of positional items and key/value entries, each kept in source
/// order. Keys may repeat.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AList {
    /// Positional items.
    pub items: Vec<Value>,
    /// Key/value entries.
    pub entries: Vec<(BString, Value)>,
}

impl AList {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value of the first entry under `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.get_all(key).next()
    }

    /// The values of every entry under `key`, in source order.
    pub fn get_all(&self, key: impl AsRef<[u8]>) -> impl Iterator<Item = &Value> {
        let key = BString::from(key.as_ref());
        self.entries
            .iter()
            .filter(move |(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Number of items plus number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + self.entries.len()
    }

    /// Whether the list has neither items nor entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.entries.is_empty()
    }
}

impl Value {
    /// Which kind of element this is.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Literal(_) => ValueKind::Literal,
            Value::String(_) => ValueKind::String,
            Value::AList(_) => ValueKind::AList,
        }
    }

    /// The bytes of a literal or string.
    #[must_use]
    pub fn as_text(&self) -> Option<&BStr> {
        match self {
            Value::Literal(text) | Value::String(text) => Some(text.as_bstr()),
            Value::AList(_) => None,
        }
    }

    /// The list, if this is one.
    #[must_use]
    pub fn as_alist(&self) -> Option<&AList> {
        match self {
            Value::AList(list) => Some(list),
            _ => None,
        }
    }
}

impl From<AList> for Value {
    fn from(list: AList) -> Self {
        Self::AList(list)
    }
}

impl Value {
    /// Source text in the default grammar that parses back to an equal value.
    ///
    /// Literal bytes are copied unchanged and strings are double-quoted with
    /// escapes for anything outside printable ASCII, so the output is exact
    /// even where [`Display`](fmt::Display) is lossy.
    #[must_use]
    pub fn to_source(&self) -> BString {
        let mut out = Vec::new();
        self.write_source(&mut out);
        out.into()
    }

    fn write_source(&self, out: &mut Vec<u8>) {
        match self {
            Value::Literal(text) => out.extend_from_slice(text),
            Value::String(text) => write_quoted(text, out),
            Value::AList(list) => list.write_source(out),
        }
    }
}

impl AList {
    /// Source text for the list; see [`Value::to_source`].
    #[must_use]
    pub fn to_source(&self) -> BString {
        let mut out = Vec::new();
        self.write_source(&mut out);
        out.into()
    }

    fn write_source(&self, out: &mut Vec<u8>) {
        out.push(b'[');
        let mut first = true;
        for item in &self.items {
            if !first {
                out.push(b',');
            }
            first = false;
            item.write_source(out);
        }
        for (key, value) in &self.entries {
            if !first {
                out.push(b',');
            }
            first = false;
            write_key(key, out);
            out.push(b'=');
            value.write_source(out);
        }
        out.push(b']');
    }
}

impl fmt::Display for Value {
    /// [`to_source`](Value::to_source), with invalid UTF-8 in literals
    /// replaced by U+FFFD.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.to_source().as_bstr(), f)
    }
}

impl fmt::Display for AList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.to_source().as_bstr(), f)
    }
}

fn write_key(key: &[u8], out: &mut Vec<u8>) {
    let classifier = CharClassifier::standard();
    let bare = !key.is_empty()
        && key
            .iter()
            .all(|&b| b.is_ascii_graphic() && !classifier.is_boundary(b) && b != b'\\');
    if bare {
        out.extend_from_slice(key);
    } else {
        write_quoted(key, out);
    }
}

fn write_quoted(text: &[u8], out: &mut Vec<u8>) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    out.push(b'"');
    for &b in text {
        match b {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\t' => out.extend_from_slice(b"\\t"),
            b'\r' => out.extend_from_slice(b"\\r"),
            0x0c => out.extend_from_slice(b"\\f"),
            0x20..=0x7e => out.push(b),
            _ => out.extend_from_slice(&[
                b'\\',
                b'x',
                HEX[usize::from(b >> 4)],
                HEX[usize::from(b & 0x0f)],
            ]),
        }
    }
    out.push(b'"');
}
