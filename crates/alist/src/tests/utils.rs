use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use crate::{ParserError, ParserOptions, StreamingParser, Value};

/// Split `payload` into `parts` chunks of roughly equal size.
///
/// # Panics
///
/// Panics if `parts` is zero.
pub(crate) fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Split `payload` at cut points derived from arbitrary `seeds`.
pub(crate) fn split_by_seeds<'a>(payload: &'a [u8], seeds: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::new();
    let mut rest = payload;
    for &seed in seeds {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(1 + seed % rest.len());
        chunks.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

pub(crate) fn parse_chunks<'a>(
    chunks: impl IntoIterator<Item = &'a [u8]>,
) -> Result<Vec<Value>, ParserError> {
    let mut parser = StreamingParser::new(ParserOptions::default());
    for chunk in chunks {
        parser.feed(chunk)?;
    }
    parser.seal()?;
    Ok(parser.collect())
}

pub(crate) fn render(values: &[Value]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[test]
fn chunk_helpers_cover_the_payload() {
    let payload = b"[alpha, beta=gamma]";
    for parts in 1..=payload.len() + 2 {
        let chunks = produce_chunks(payload, parts);
        assert_eq!(chunks.concat(), payload);
        assert!(chunks.len() <= parts);
    }

    let chunks = split_by_seeds(payload, &[0, 3, 100]);
    assert_eq!(chunks[0], b"[");
    assert_eq!(chunks[1], b"alph");
    assert_eq!(chunks.concat(), payload);
}
