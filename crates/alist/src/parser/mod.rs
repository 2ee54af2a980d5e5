//! The streaming parser.
//!
//! Parsing is driven by an explicit stack of [`Frame`]s instead of recursion,
//! so nesting depth is bounded only by memory and parsing can stop at any
//! byte and resume when more input is fed. Each step looks at the frame on
//! top of the stack, consumes what it can from the input buffer, and either
//! continues or suspends until more input arrives.
//!
//! Every step checks that its input is legal before touching the stack or
//! the buffer. A step that fails leaves the parser exactly as it was before
//! the offending byte, so the same error is reported again if the parser is
//! fed more input.

mod buffer;
mod frame;

use alloc::{collections::VecDeque, vec::Vec};
use core::fmt;

use log::{debug, trace};

use self::buffer::InputBuffer;
pub use self::frame::State;
use self::frame::{Frame, ListFrame, Node, Slot, StrFrame};
use crate::{
    Builder, CharClassifier, Class, ParserError, ParserOptions, StdBuilder, SyntaxError,
    TruncatedInput, ValueKind,
    escape::{self, Escape},
};

/// A streaming parser producing [`Value`](crate::Value)s with the default
/// grammar.
pub type StreamingParser = StreamingParserImpl<'static, StdBuilder>;

/// How the bytes fed in one call end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputEnd {
    /// More bytes may continue the last token.
    Open,
    /// The bytes form a complete line; the line end is a token boundary.
    Line,
    /// No more bytes will arrive.
    Closed,
}

impl InputEnd {
    fn may_continue(self) -> bool {
        matches!(self, InputEnd::Open)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Suspend,
}

/// An incremental parser for alist text.
///
/// Bytes are fed with [`feed`](Self::feed) or [`feed_line`](Self::feed_line)
/// in chunks of any size; completed top-level values queue up and are taken
/// with [`extract`](Self::extract) or by iterating the parser.
/// [`seal`](Self::seal) ends the input. Values are built through a
/// [`Builder`].
///
/// # Examples
///
/// ```
/// use alist::{ParserOptions, StreamingParser, Value};
///
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// parser.feed("[a, k=").unwrap();
/// assert_eq!(parser.extract(), None);
/// parser.feed("'v'] tail").unwrap();
/// parser.seal().unwrap();
///
/// let values: Vec<Value> = parser.collect();
/// assert_eq!(values.len(), 2);
/// assert_eq!(values[0].to_string(), r#"[a,k="v"]"#);
/// assert_eq!(values[1], Value::Literal("tail".into()));
/// ```
pub struct StreamingParserImpl<'g, B: Builder> {
    classifier: &'g CharClassifier,
    builder: B,
    options: ParserOptions,
    input: InputBuffer,
    stack: Vec<Frame<B>>,
    results: VecDeque<B::Value>,
    /// Bytes past the read position already scanned into a pending literal.
    literal_scanned: usize,
    sealed: bool,
}

impl<B: Builder + Default> StreamingParserImpl<'static, B> {
    /// A parser for the default grammar using `B::default()`.
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self::with_builder(B::default(), options)
    }
}

impl<B: Builder> StreamingParserImpl<'static, B> {
    /// A parser for the default grammar using `builder`.
    pub fn with_builder(builder: B, options: ParserOptions) -> Self {
        Self::with_classifier(CharClassifier::standard(), builder, options)
    }
}

impl<'g, B: Builder> StreamingParserImpl<'g, B> {
    /// A parser for the grammar `classifier` was built from.
    pub fn with_classifier(
        classifier: &'g CharClassifier,
        builder: B,
        options: ParserOptions,
    ) -> Self {
        let mut stack = Vec::new();
        stack.push(Frame::ElementStart);
        Self {
            classifier,
            builder,
            options,
            input: InputBuffer::new(),
            stack,
            results: VecDeque::new(),
            literal_scanned: 0,
            sealed: false,
        }
    }

    /// Feed a chunk of input.
    ///
    /// A token that reaches the end of the chunk stays buffered until later
    /// input or [`seal`](Self::seal) completes it, so any split of the same
    /// bytes produces the same values. Two things are tied to the feed
    /// itself: a comment discards the rest of the bytes buffered so far, and
    /// a multiline string whose content reaches the end of the feed gets a
    /// line feed appended. A feed that ends right after an opening quote run,
    /// an escape or a quote byte adds none. An empty chunk does nothing.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error in the buffered input. The offending
    /// byte stays buffered and every value completed before it remains
    /// available from [`extract`](Self::extract).
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) -> Result<(), ParserError> {
        let chunk = chunk.as_ref();
        if chunk.is_empty() {
            return Ok(());
        }
        self.resume(chunk, InputEnd::Open)
    }

    /// Feed one complete line, without its line terminator.
    ///
    /// The end of the line is a token boundary: a literal in progress ends
    /// there and a quote run at the end of the line is decided with the bytes
    /// at hand. Otherwise this behaves as [`feed`](Self::feed), so an empty
    /// line inside a multiline string contributes nothing.
    ///
    /// # Errors
    ///
    /// As for [`feed`](Self::feed).
    pub fn feed_line(&mut self, line: impl AsRef<[u8]>) -> Result<(), ParserError> {
        self.resume(line.as_ref(), InputEnd::Line)
    }

    /// End the input.
    ///
    /// Buffered bytes are parsed as if nothing follows them; an element still
    /// open afterwards is released through the builder together with every
    /// partial container. Queued results stay available. Sealing twice is a
    /// no-op, and input fed after sealing is ignored.
    ///
    /// # Errors
    ///
    /// Returns a syntax error found in the buffered bytes, or
    /// [`SyntaxError::UnterminatedInput`] when an element was left open and
    /// [`ParserOptions::truncated_input`] is [`TruncatedInput::Error`]. The
    /// parser is sealed and its partial state released either way.
    pub fn seal(&mut self) -> Result<(), ParserError> {
        if self.sealed {
            return Ok(());
        }

        let driven = if self.stack.is_empty() {
            Ok(())
        } else {
            self.drive(InputEnd::Closed)
        };
        let truncated = !matches!(self.stack.as_slice(), [] | [Frame::ElementStart]);
        let end = self.input.offset(self.input.len());

        self.sealed = true;
        self.abandon();
        debug!(
            "sealed at byte {end}: {} result(s) queued, truncated: {truncated}",
            self.results.len()
        );

        driven?;
        if truncated && self.options.truncated_input == TruncatedInput::Error {
            return Err(ParserError::new(SyntaxError::UnterminatedInput, end));
        }
        Ok(())
    }

    /// Take the oldest completed top-level value.
    pub fn extract(&mut self) -> Option<B::Value> {
        self.results.pop_front()
    }

    /// Number of completed values waiting to be extracted.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.results.len()
    }

    /// Number of bytes fed but not yet consumed.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.input.unread()
    }

    /// Number of frames on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The state of every frame, outermost first.
    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        self.stack.iter().map(Frame::state)
    }

    /// Whether [`seal`](Self::seal) has been called.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Whether the parser ignores further input: it is sealed, or it has
    /// completed its single value.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.sealed || self.stack.is_empty()
    }

    /// The options the parser was created with.
    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// The classifier in use.
    #[must_use]
    pub fn classifier(&self) -> &'g CharClassifier {
        self.classifier
    }

    /// The builder.
    #[must_use]
    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// The builder, mutably.
    pub fn builder_mut(&mut self) -> &mut B {
        &mut self.builder
    }

    fn resume(&mut self, bytes: &[u8], end: InputEnd) -> Result<(), ParserError> {
        if self.is_idle() {
            if !bytes.is_empty() {
                debug!("ignoring {} byte(s) fed to an idle parser", bytes.len());
            }
            return Ok(());
        }

        self.input.push(bytes);
        let result = self.drive(end);
        self.input.compact(self.options.compact_threshold);
        result
    }

    fn drive(&mut self, end: InputEnd) -> Result<(), ParserError> {
        loop {
            let Some(state) = self.stack.last().map(Frame::state) else {
                if self.input.unread() > 0 {
                    debug!(
                        "ignoring {} byte(s) after the document",
                        self.input.unread()
                    );
                }
                self.input.discard_rest();
                return Ok(());
            };

            let flow = match state {
                State::ElementStart => self.element_start(end)?,
                State::ElementEnd => self.element_end()?,
                State::InAList | State::InAListAfterKey => self.in_alist()?,
                State::InQuotedString => self.in_quoted_string(end)?,
                State::InMultilineString => self.in_multiline_string(end)?,
            };

            if flow == Flow::Suspend {
                return Ok(());
            }
        }
    }

    fn element_start(&mut self, end: InputEnd) -> Result<Flow, ParserError> {
        let s = self
            .classifier
            .skip_whitespace(self.input.bytes(), self.input.pos());
        self.input.advance_to(s);
        let Some(b) = self.input.get(s) else {
            return Ok(Flow::Suspend);
        };

        match self.classifier.class(b) {
            Class::Plain => self.scan_literal(s, end),
            Class::Open(variant) => {
                let list = self.builder.new_list();
                self.replace_top(Frame::AList(ListFrame::new(list, variant)));
                self.input.advance_to(s + 1);
                trace!("list opened at byte {}", self.input.offset(s));
                Ok(Flow::Continue)
            }
            Class::Quote(variant) => self.open_string(s, b, variant, end),
            Class::Comment => {
                self.input.discard_rest();
                Ok(Flow::Suspend)
            }
            Class::KvSeparator => Err(self.error(SyntaxError::UnexpectedSeparator(b), s)),
            Class::Whitespace | Class::ItemSeparator | Class::Close(_) => {
                Err(self.error(SyntaxError::UnexpectedCharAtElementStart(b), s))
            }
        }
    }

    fn scan_literal(&mut self, s: usize, end: InputEnd) -> Result<Flow, ParserError> {
        let e = self
            .classifier
            .literal_end(self.input.bytes(), s + self.literal_scanned);
        if e == self.input.len() && end.may_continue() {
            self.literal_scanned = e - s;
            return Ok(Flow::Suspend);
        }

        self.literal_scanned = 0;
        let value = self.builder.new_literal(self.input.slice(s, e));
        self.replace_top(Frame::ElementEnd(Node {
            value,
            kind: ValueKind::Literal,
        }));
        self.input.advance_to(e);
        Ok(Flow::Continue)
    }

    fn open_string(
        &mut self,
        s: usize,
        quote: u8,
        variant: u8,
        end: InputEnd,
    ) -> Result<Flow, ParserError> {
        let multiline = match (self.input.get(s + 1), self.input.get(s + 2)) {
            (Some(a), Some(b)) => a == quote && b == quote,
            (Some(a), None) if a != quote => false,
            // A quote-run at the end of the input may still become three.
            (_, None) if end.may_continue() => return Ok(Flow::Suspend),
            _ => false,
        };

        let frame = StrFrame {
            text: self.builder.new_string(),
            variant,
        };
        if multiline {
            self.replace_top(Frame::MultilineString(frame));
            self.input.advance_to(s + 3);
        } else {
            self.replace_top(Frame::QuotedString(frame));
            self.input.advance_to(s + 1);
        }
        Ok(Flow::Continue)
    }

    fn element_end(&mut self) -> Result<Flow, ParserError> {
        let node = match self.stack.pop() {
            Some(Frame::ElementEnd(node)) => node,
            other => {
                self.stack.extend(other);
                return Err(self.invalid_state("expected a completed element"));
            }
        };

        match self.stack.pop() {
            None => {
                trace!("top-level {:?} completed", node.kind);
                self.results.push_back(node.value);
                if self.options.allow_multiple_values {
                    self.stack.push(Frame::ElementStart);
                } else {
                    debug!("single value complete, parser idle");
                }
            }
            Some(Frame::AList(frame)) => {
                let frame = frame.accept(node, &mut self.builder);
                self.stack.push(Frame::AList(frame));
            }
            Some(parent) => {
                self.stack.push(parent);
                self.stack.push(Frame::ElementEnd(node));
                return Err(self.invalid_state("completed element outside a list"));
            }
        }
        Ok(Flow::Continue)
    }

    fn in_alist(&mut self) -> Result<Flow, ParserError> {
        let (variant, slot) = match self.stack.last() {
            Some(Frame::AList(frame)) => (frame.variant, frame.pending.slot()),
            _ => return Err(self.invalid_state("expected a list")),
        };

        let s = self
            .classifier
            .skip_whitespace(self.input.bytes(), self.input.pos());
        self.input.advance_to(s);
        let Some(b) = self.input.get(s) else {
            return Ok(Flow::Suspend);
        };

        match (self.classifier.class(b), slot) {
            (Class::Comment, _) => {
                self.input.discard_rest();
                Ok(Flow::Suspend)
            }
            (Class::KvSeparator, Slot::Empty) => {
                Err(self.error(SyntaxError::MissingKeyBeforeSeparator, s))
            }
            (Class::KvSeparator, Slot::Item(ValueKind::AList)) => {
                Err(self.error(SyntaxError::InvalidKeyType, s))
            }
            (Class::KvSeparator, Slot::Key) => {
                Err(self.error(SyntaxError::UnexpectedSeparator(b), s))
            }
            (Class::KvSeparator, Slot::Item(_)) => {
                if let Some(Frame::AList(frame)) = self.stack.last_mut() {
                    frame.promote_key();
                }
                self.stack.push(Frame::ElementStart);
                self.input.advance_to(s + 1);
                Ok(Flow::Continue)
            }
            // The value of a key/value pair.
            (_, Slot::Key) => {
                self.stack.push(Frame::ElementStart);
                Ok(Flow::Continue)
            }
            (Class::Close(closing), _) if closing == variant => self.close_list(s),
            (Class::Close(_), _) => {
                Err(self.error(SyntaxError::UnexpectedCharAtElementStart(b), s))
            }
            (Class::ItemSeparator, _) => {
                self.stack.push(Frame::ElementStart);
                self.input.advance_to(s + 1);
                Ok(Flow::Continue)
            }
            _ => {
                self.stack.push(Frame::ElementStart);
                Ok(Flow::Continue)
            }
        }
    }

    fn close_list(&mut self, s: usize) -> Result<Flow, ParserError> {
        let frame = match self.stack.pop() {
            Some(Frame::AList(frame)) => frame,
            other => {
                self.stack.extend(other);
                return Err(self.invalid_state("expected a list"));
            }
        };
        let value = frame.close(&mut self.builder);
        self.stack.push(Frame::ElementEnd(Node {
            value,
            kind: ValueKind::AList,
        }));
        self.input.advance_to(s + 1);
        trace!("list closed at byte {}", self.input.offset(s));
        Ok(Flow::Continue)
    }

    fn in_quoted_string(&mut self, end: InputEnd) -> Result<Flow, ParserError> {
        let frame = self.pop_string()?;
        let (frame, e) = self.copy_string_run(frame);

        match self.input.get(e) {
            None => {
                self.stack.push(Frame::QuotedString(frame));
                Ok(Flow::Suspend)
            }
            Some(b'\\') => self.decode_escape(frame, e, end, false),
            Some(_) => {
                let value = self.builder.finalize_string(frame.text);
                self.stack.push(Frame::ElementEnd(Node {
                    value,
                    kind: ValueKind::String,
                }));
                self.input.advance_to(e + 1);
                Ok(Flow::Continue)
            }
        }
    }

    fn in_multiline_string(&mut self, end: InputEnd) -> Result<Flow, ParserError> {
        let frame = self.pop_string()?;
        let had_bytes = self.input.unread() > 0;
        let (mut frame, e) = self.copy_string_run(frame);

        let quote = match self.input.get(e) {
            None => {
                // Running out of bytes mid-string ends a line of it; a step
                // entered with nothing to read ends none.
                if had_bytes && end != InputEnd::Closed {
                    frame.text = self.builder.string_append_byte(frame.text, b'\n');
                }
                self.stack.push(Frame::MultilineString(frame));
                return Ok(Flow::Suspend);
            }
            Some(b'\\') => return self.decode_escape(frame, e, end, true),
            Some(quote) => quote,
        };

        let run = self
            .input
            .rest_from(e)
            .iter()
            .take(3)
            .take_while(|&&b| b == quote)
            .count();
        if run == 3 {
            let value = self.builder.finalize_string(frame.text);
            self.stack.push(Frame::ElementEnd(Node {
                value,
                kind: ValueKind::String,
            }));
            self.input.advance_to(e + 3);
        } else {
            frame.text = self.builder.string_append_byte(frame.text, quote);
            self.stack.push(Frame::MultilineString(frame));
            self.input.advance_to(e + 1);
        }
        Ok(Flow::Continue)
    }

    /// Append string content up to the next backslash or closing quote and
    /// return its index.
    fn copy_string_run(&mut self, mut frame: StrFrame<B>) -> (StrFrame<B>, usize) {
        let start = self.input.pos();
        let e = self
            .classifier
            .string_stop(self.input.bytes(), start, frame.variant);
        if e > start {
            frame.text = self
                .builder
                .string_append_bytes(frame.text, self.input.slice(start, e));
            self.input.advance_to(e);
        }
        (frame, e)
    }

    fn decode_escape(
        &mut self,
        mut frame: StrFrame<B>,
        at: usize,
        end: InputEnd,
        multiline: bool,
    ) -> Result<Flow, ParserError> {
        let decoded = escape::decode(
            self.input.rest_from(at + 1),
            self.classifier,
            end == InputEnd::Closed,
        );

        let flow = match decoded {
            Ok(Escape::Byte { byte, len }) => {
                frame.text = self.builder.string_append_byte(frame.text, byte);
                self.input.advance_to(at + 1 + len);
                Ok(Flow::Continue)
            }
            Ok(Escape::Backslash) => {
                frame.text = self.builder.string_append_byte(frame.text, b'\\');
                self.input.advance_to(at + 1);
                Ok(Flow::Continue)
            }
            Ok(Escape::Incomplete) => Ok(Flow::Suspend),
            Err(kind) => Err(self.error(kind, at)),
        };

        self.stack.push(if multiline {
            Frame::MultilineString(frame)
        } else {
            Frame::QuotedString(frame)
        });
        flow
    }

    fn pop_string(&mut self) -> Result<StrFrame<B>, ParserError> {
        match self.stack.pop() {
            Some(Frame::QuotedString(frame) | Frame::MultilineString(frame)) => Ok(frame),
            other => {
                self.stack.extend(other);
                Err(self.invalid_state("expected a string"))
            }
        }
    }

    fn replace_top(&mut self, frame: Frame<B>) {
        if let Some(top) = self.stack.last_mut() {
            *top = frame;
        }
    }

    /// Release every frame and drop all buffered input.
    fn abandon(&mut self) {
        let frames = self.stack.len();
        while let Some(frame) = self.stack.pop() {
            frame.release(&mut self.builder);
        }
        if frames > 0 {
            debug!("released {frames} frame(s)");
        }
        self.input.clear();
        self.literal_scanned = 0;
    }

    fn error(&self, kind: SyntaxError, at: usize) -> ParserError {
        ParserError::new(kind, self.input.offset(at))
    }

    fn invalid_state(&self, what: &'static str) -> ParserError {
        self.error(SyntaxError::InvalidParserState(what), self.input.pos())
    }
}

impl<B: Builder> Iterator for StreamingParserImpl<'_, B> {
    type Item = B::Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.extract()
    }
}

impl<B: Builder> Drop for StreamingParserImpl<'_, B> {
    fn drop(&mut self) {
        self.abandon();
        while let Some(value) = self.results.pop_front() {
            self.builder.release_value(value);
        }
    }
}

impl<B: Builder> fmt::Debug for StreamingParserImpl<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingParser")
            .field("states", &self.states().collect::<Vec<_>>())
            .field("buffered", &self.buffered())
            .field("queued", &self.results.len())
            .field("sealed", &self.sealed)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
