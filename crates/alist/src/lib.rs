//! A streaming, incremental parser for the alist data format.
//!
//! An alist document is a sequence of elements: bare literals, quoted strings
//! (single-line or triple-quoted multiline) and bracketed lists that mix
//! positional items with `key=value` pairs:
//!
//! ```text
//! [name=server, ports=[80, 443], banner='''Welcome
//! aboard''', enabled]
//! ```
//!
//! Input may be fed in chunks of any size; the parser keeps an explicit
//! frame stack, so it suspends wherever the input runs out and resumes when
//! more arrives. Values are built through the [`Builder`] trait;
//! [`StdBuilder`] produces owned [`Value`] trees.
//!
//! ```
//! use alist::{ParserOptions, StreamingParser};
//!
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! for chunk in ["[a, b", "=c, 'd", "'] e"] {
//!     parser.feed(chunk).unwrap();
//! }
//! parser.seal().unwrap();
//!
//! let rendered: Vec<String> = parser.map(|v| v.to_string()).collect();
//! assert_eq!(rendered, [r#"[a,"d",b=c]"#, "e"]);
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod builder;
mod classifier;
mod error;
mod escape;
mod extractor;
mod options;
mod parser;
mod value;

#[cfg(test)]
mod tests;

use alloc::vec::Vec;

use bstr::ByteSlice;

pub use builder::{Builder, StdBuilder, ValueKind};
pub use classifier::{CharClassifier, Class, Grammar, UnknownEscape};
pub use error::{GrammarError, ParserError, SyntaxError};
pub use extractor::{CommentExtractor, CommentRegions};
pub use options::{DEFAULT_COMPACT_THRESHOLD, ParserOptions, TruncatedInput};
pub use parser::{State, StreamingParser, StreamingParserImpl};
pub use value::{AList, Value};

/// Parse a complete document fed as a single chunk.
///
/// # Errors
///
/// Returns the first syntax error in `input`.
pub fn parse(input: impl AsRef<[u8]>) -> Result<Vec<Value>, ParserError> {
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed(input)?;
    parser.seal()?;
    Ok(parser.collect())
}

/// Parse a complete document line by line.
///
/// Lines end at `\n` or `\r\n`. Unlike [`parse`], a comment only discards the
/// rest of its own line.
///
/// # Errors
///
/// Returns the first syntax error in `input`.
pub fn parse_lines(input: impl AsRef<[u8]>) -> Result<Vec<Value>, ParserError> {
    let mut parser = StreamingParser::new(ParserOptions::default());
    for line in input.as_ref().lines() {
        parser.feed_line(line)?;
    }
    parser.seal()?;
    Ok(parser.collect())
}
