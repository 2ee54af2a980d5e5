/// Buffered bytes past this read position are dropped from the front of the
/// input buffer.
pub const DEFAULT_COMPACT_THRESHOLD: usize = 4096;

/// What [`seal`](crate::StreamingParserImpl::seal) does when the input ends
/// inside an unterminated element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncatedInput {
    /// Release the partial element and report success.
    #[default]
    Discard,
    /// Release the partial element and report
    /// [`SyntaxError::UnterminatedInput`](crate::SyntaxError::UnterminatedInput).
    Error,
}

/// Configuration options for the streaming parser.
///
/// # Default
///
/// Multiple top-level values, truncated input discarded at seal, and a
/// compaction threshold of [`DEFAULT_COMPACT_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Whether to parse a sequence of top-level values.
    ///
    /// When `false`, the parser goes idle after the first complete value and
    /// ignores every byte fed afterwards.
    ///
    /// # Default
    ///
    /// `true`
    pub allow_multiple_values: bool,

    /// Handling of an element left open when the input is sealed.
    ///
    /// # Default
    ///
    /// [`TruncatedInput::Discard`]
    pub truncated_input: TruncatedInput,

    /// Number of consumed bytes the input buffer may hold before they are
    /// dropped. Fully consumed buffers are always cleared.
    ///
    /// # Default
    ///
    /// [`DEFAULT_COMPACT_THRESHOLD`]
    pub compact_threshold: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            allow_multiple_values: true,
            truncated_input: TruncatedInput::Discard,
            compact_threshold: DEFAULT_COMPACT_THRESHOLD,
        }
    }
}
