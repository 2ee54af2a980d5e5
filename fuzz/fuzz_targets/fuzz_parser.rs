#![no_main]
use alist::{ParserError, ParserOptions, StreamingParser, TruncatedInput, Value, parse};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    flags: u8,
    splits: Vec<u16>,
    data: &'a [u8],
}

impl Input<'_> {
    fn options(&self) -> ParserOptions {
        ParserOptions {
            allow_multiple_values: self.flags & 1 == 0,
            truncated_input: if self.flags & 2 == 0 {
                TruncatedInput::Discard
            } else {
                TruncatedInput::Error
            },
            compact_threshold: usize::from(self.flags >> 2),
        }
    }

    /// Split `data` into non-empty chunks at offsets derived from `splits`.
    fn chunks(&self) -> Vec<&[u8]> {
        let mut chunks = Vec::new();
        let mut rest = self.data;
        for &split in &self.splits {
            if rest.is_empty() {
                break;
            }
            let (head, tail) = rest.split_at(1 + usize::from(split) % rest.len());
            chunks.push(head);
            rest = tail;
        }
        if !rest.is_empty() {
            chunks.push(rest);
        }
        chunks
    }
}

fn run<'a>(
    options: ParserOptions,
    chunks: impl IntoIterator<Item = &'a [u8]>,
) -> Result<Vec<Value>, ParserError> {
    let mut parser = StreamingParser::new(options);
    for chunk in chunks {
        parser.feed(chunk)?;
    }
    parser.seal()?;
    Ok(parser.collect())
}

/// Comments and multiline strings are tied to feed boundaries.
fn split_sensitive(data: &[u8]) -> bool {
    data.contains(&b'#') || data.windows(3).any(|w| w == b"'''" || w == br#"""""#)
}

fuzz_target!(|input: Input<'_>| {
    let options = input.options();
    let whole = run(options, [input.data]);
    let chunked = run(options, input.chunks());

    if !split_sensitive(input.data) {
        assert_eq!(whole, chunked, "chunking changed the result");
    }

    if let Ok(values) = whole {
        for value in values {
            let text = value.to_source();
            assert_eq!(parse(&text), Ok(vec![value]), "source form {text:?} did not round-trip");
        }
    }
});
