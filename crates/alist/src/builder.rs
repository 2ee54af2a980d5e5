use alloc::string::ToString;

use bstr::BString;

use crate::value::{AList, Value};

/// The three kinds of element the format has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A bare run of non-delimiter bytes.
    Literal,
    /// A quoted string, single-line or multiline.
    String,
    /// A bracketed list of items and key/value pairs.
    AList,
}

/// Abstraction over value construction.
///
/// The parser never inspects the values it builds. Every handle it receives
/// is passed back by value exactly once: into another builder call, out of
/// the parser as a result, or into one of the `release_*` hooks when a
/// partial element is abandoned. The hooks default to dropping the handle;
/// builders whose handles refer to external resources override them.
///
/// Keys passed to [`list_append_kv`](Builder::list_append_kv) are always
/// values built by [`new_literal`](Builder::new_literal) or
/// [`finalize_string`](Builder::finalize_string).
pub trait Builder {
    /// A list under construction.
    type List;
    /// A string under construction.
    type Str;
    /// A finished element.
    type Value;

    /// Start an empty list.
    fn new_list(&mut self) -> Self::List;
    /// Append a positional item.
    fn list_append_item(&mut self, list: Self::List, item: Self::Value) -> Self::List;
    /// Append a key/value pair.
    fn list_append_kv(
        &mut self,
        list: Self::List,
        key: Self::Value,
        value: Self::Value,
    ) -> Self::List;
    /// Finish a list.
    fn finalize_list(&mut self, list: Self::List) -> Self::Value;

    /// Start an empty string.
    fn new_string(&mut self) -> Self::Str;
    /// Append one decoded byte.
    fn string_append_byte(&mut self, s: Self::Str, byte: u8) -> Self::Str;
    /// Append a run of content bytes.
    fn string_append_bytes(&mut self, s: Self::Str, bytes: &[u8]) -> Self::Str {
        bytes
            .iter()
            .fold(s, |s, &byte| self.string_append_byte(s, byte))
    }
    /// Finish a string.
    fn finalize_string(&mut self, s: Self::Str) -> Self::Value;

    /// Build a literal from its exact bytes.
    fn new_literal(&mut self, bytes: &[u8]) -> Self::Value;

    /// Dispose of an abandoned list.
    fn release_list(&mut self, list: Self::List) {
        drop(list);
    }
    /// Dispose of an abandoned string.
    fn release_string(&mut self, s: Self::Str) {
        drop(s);
    }
    /// Dispose of an abandoned finished element.
    fn release_value(&mut self, value: Self::Value) {
        drop(value);
    }
}

/// Builder producing owned [`Value`] trees.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdBuilder;

impl Builder for StdBuilder {
    type List = AList;
    type Str = BString;
    type Value = Value;

    #[inline]
    fn new_list(&mut self) -> Self::List {
        AList::new()
    }

    #[inline]
    fn list_append_item(&mut self, mut list: Self::List, item: Self::Value) -> Self::List {
        list.items.push(item);
        list
    }

    fn list_append_kv(
        &mut self,
        mut list: Self::List,
        key: Self::Value,
        value: Self::Value,
    ) -> Self::List {
        let key = match key {
            Value::Literal(text) | Value::String(text) => text,
            // Unreachable from the parser; keyed by its source text otherwise.
            Value::AList(nested) => BString::from(nested.to_string()),
        };
        list.entries.push((key, value));
        list
    }

    #[inline]
    fn finalize_list(&mut self, list: Self::List) -> Self::Value {
        Value::AList(list)
    }

    #[inline]
    fn new_string(&mut self) -> Self::Str {
        BString::default()
    }

    #[inline]
    fn string_append_byte(&mut self, mut s: Self::Str, byte: u8) -> Self::Str {
        s.push(byte);
        s
    }

    #[inline]
    fn string_append_bytes(&mut self, mut s: Self::Str, bytes: &[u8]) -> Self::Str {
        s.extend_from_slice(bytes);
        s
    }

    #[inline]
    fn finalize_string(&mut self, s: Self::Str) -> Self::Value {
        Value::String(s)
    }

    #[inline]
    fn new_literal(&mut self, bytes: &[u8]) -> Self::Value {
        Value::Literal(BString::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_builder_assembles_lists() {
        let mut b = StdBuilder;
        let list = b.new_list();
        let item = b.new_literal(b"a");
        let list = b.list_append_item(list, item);
        let key = b.new_literal(b"k");
        let s = b.new_string();
        let s = b.string_append_bytes(s, b"v ");
        let s = b.string_append_byte(s, b'1');
        let value = b.finalize_string(s);
        let list = b.list_append_kv(list, key, value);
        let value = b.finalize_list(list);

        let Value::AList(list) = value else {
            panic!("expected a list, got {value:?}");
        };
        assert_eq!(list.items, [Value::Literal("a".into())]);
        assert_eq!(list.entries, [("k".into(), Value::String("v 1".into()))]);
    }

    #[test]
    fn default_string_append_bytes_folds_single_bytes() {
        struct Counting(usize);
        impl Builder for Counting {
            type List = ();
            type Str = alloc::vec::Vec<u8>;
            type Value = ();
            fn new_list(&mut self) {}
            fn list_append_item(&mut self, (): (), (): ()) {}
            fn list_append_kv(&mut self, (): (), (): (), (): ()) {}
            fn finalize_list(&mut self, (): ()) {}
            fn new_string(&mut self) -> Self::Str {
                alloc::vec::Vec::new()
            }
            fn string_append_byte(&mut self, mut s: Self::Str, byte: u8) -> Self::Str {
                self.0 += 1;
                s.push(byte);
                s
            }
            fn finalize_string(&mut self, _: Self::Str) {}
            fn new_literal(&mut self, _: &[u8]) {}
        }

        let mut b = Counting(0);
        let s = b.new_string();
        let s = b.string_append_bytes(s, b"abc");
        assert_eq!(s, b"abc");
        assert_eq!(b.0, 3);
    }
}
