use core::mem;

use crate::{Builder, ValueKind};

/// What the parser is doing at one level of nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Waiting for the first byte of an element.
    ElementStart,
    /// An element is complete and waiting to be attached to its container.
    ElementEnd,
    /// Inside a list, between members.
    InAList,
    /// Inside a list, after a key/value separator.
    InAListAfterKey,
    /// Inside a single-line quoted string.
    InQuotedString,
    /// Inside a triple-quoted multiline string.
    InMultilineString,
}

/// A completed element together with its kind, which decides whether it
/// may become a key.
pub(crate) struct Node<V> {
    pub(crate) value: V,
    pub(crate) kind: ValueKind,
}

/// The member a list holds back until the next token shows whether it is
/// an item or a key.
pub(crate) enum Pending<V> {
    Empty,
    Item(Node<V>),
    Key(V),
}

/// A copyable summary of [`Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Empty,
    Item(ValueKind),
    Key,
}

impl<V> Pending<V> {
    pub(crate) fn slot(&self) -> Slot {
        match self {
            Pending::Empty => Slot::Empty,
            Pending::Item(node) => Slot::Item(node.kind),
            Pending::Key(_) => Slot::Key,
        }
    }
}

pub(crate) struct ListFrame<B: Builder> {
    pub(crate) list: B::List,
    pub(crate) variant: u8,
    pub(crate) pending: Pending<B::Value>,
}

impl<B: Builder> ListFrame<B> {
    pub(crate) fn new(list: B::List, variant: u8) -> Self {
        Self {
            list,
            variant,
            pending: Pending::Empty,
        }
    }

    /// Attach a completed member. A held item is flushed first; a held key
    /// pairs with `node` into an entry.
    pub(crate) fn accept(mut self, node: Node<B::Value>, builder: &mut B) -> Self {
        self.pending = match mem::replace(&mut self.pending, Pending::Empty) {
            Pending::Empty => Pending::Item(node),
            Pending::Item(held) => {
                self.list = builder.list_append_item(self.list, held.value);
                Pending::Item(node)
            }
            Pending::Key(key) => {
                self.list = builder.list_append_kv(self.list, key, node.value);
                Pending::Empty
            }
        };
        self
    }

    /// Turn the held item into a key.
    pub(crate) fn promote_key(&mut self) {
        self.pending = match mem::replace(&mut self.pending, Pending::Empty) {
            Pending::Item(node) => Pending::Key(node.value),
            other => other,
        };
    }

    pub(crate) fn close(self, builder: &mut B) -> B::Value {
        let list = match self.pending {
            Pending::Empty => self.list,
            Pending::Item(held) => builder.list_append_item(self.list, held.value),
            // A held key always has an element frame above it, so the list
            // cannot be closed; release rather than drop it regardless.
            Pending::Key(key) => {
                builder.release_value(key);
                self.list
            }
        };
        builder.finalize_list(list)
    }
}

pub(crate) struct StrFrame<B: Builder> {
    pub(crate) text: B::Str,
    pub(crate) variant: u8,
}

pub(crate) enum Frame<B: Builder> {
    ElementStart,
    ElementEnd(Node<B::Value>),
    AList(ListFrame<B>),
    QuotedString(StrFrame<B>),
    MultilineString(StrFrame<B>),
}

impl<B: Builder> Frame<B> {
    pub(crate) fn state(&self) -> State {
        match self {
            Frame::ElementStart => State::ElementStart,
            Frame::ElementEnd(_) => State::ElementEnd,
            Frame::AList(frame) => match frame.pending {
                Pending::Key(_) => State::InAListAfterKey,
                Pending::Empty | Pending::Item(_) => State::InAList,
            },
            Frame::QuotedString(_) => State::InQuotedString,
            Frame::MultilineString(_) => State::InMultilineString,
        }
    }

    /// Hand every builder handle the frame owns to the matching release hook.
    pub(crate) fn release(self, builder: &mut B) {
        match self {
            Frame::ElementStart => {}
            Frame::ElementEnd(node) => builder.release_value(node.value),
            Frame::AList(frame) => {
                match frame.pending {
                    Pending::Empty => {}
                    Pending::Item(held) => builder.release_value(held.value),
                    Pending::Key(key) => builder.release_value(key),
                }
                builder.release_list(frame.list);
            }
            Frame::QuotedString(frame) | Frame::MultilineString(frame) => {
                builder.release_string(frame.text);
            }
        }
    }
}
