use alloc::{string::ToString, vec, vec::Vec};

use super::utils::render;
use crate::{ParserOptions, State, StreamingParser, SyntaxError, Value, parse, parse_lines};

fn parser() -> StreamingParser {
    StreamingParser::new(ParserOptions::default())
}

#[test]
fn multiline_string_gains_a_newline_per_feed() {
    let mut p = parser();
    p.feed("'''hello").unwrap();
    p.feed("world'''").unwrap();
    p.seal().unwrap();
    assert_eq!(p.collect::<Vec<_>>(), [Value::String("hello\nworld".into())]);
}

#[test]
fn quoted_string_spans_feeds_without_newline() {
    let mut p = parser();
    p.feed("'ab").unwrap();
    p.feed("c'").unwrap();
    p.seal().unwrap();
    assert_eq!(p.collect::<Vec<_>>(), [Value::String("abc".into())]);
}

#[test]
fn multiline_lines_and_empty_lines() {
    // An empty line has no bytes to end, so it adds nothing.
    let values = parse_lines("[x='''first\n\n  third''']\n").unwrap();
    assert_eq!(render(&values), [r#"[x="first\n  third"]"#]);
}

#[test]
fn multiline_opening_at_line_end_adds_no_newline() {
    let values = parse_lines("[doc='''\ntext\n''']").unwrap();
    assert_eq!(render(&values), [r#"[doc="text\n"]"#]);

    let mut p = parser();
    p.feed("'''").unwrap();
    p.feed("hello'''").unwrap();
    p.seal().unwrap();
    assert_eq!(p.collect::<Vec<_>>(), [Value::String("hello".into())]);
}

#[test]
fn multiline_feed_ending_after_escape_or_quote_adds_no_newline() {
    let mut p = parser();
    for chunk in ["'''a\\t", "b'", "c'''"] {
        p.feed(chunk).unwrap();
    }
    p.seal().unwrap();
    assert_eq!(p.collect::<Vec<_>>(), [Value::String("a\tb'c".into())]);
}

#[test]
fn comment_divergence_between_whole_and_line_feeding() {
    let src = "[a, #comment\nb]";

    // Fed whole, the comment swallows everything after it and the list never
    // closes.
    assert_eq!(parse(src), Ok(vec![]));

    // Line by line, the comment ends with its line.
    let values = parse_lines(src).unwrap();
    assert_eq!(render(&values), ["[a,b]"]);

    assert_eq!(render(&parse("a #comment\nb").unwrap()), ["a"]);
    assert_eq!(render(&parse_lines("a #comment\nb").unwrap()), ["a", "b"]);
}

#[test]
fn literal_waits_for_a_boundary() {
    let mut p = parser();
    p.feed("abc").unwrap();
    assert_eq!(p.extract(), None);
    assert_eq!(p.buffered(), 3);
    p.feed("def").unwrap();
    assert_eq!(p.extract(), None);
    p.feed(" ").unwrap();
    assert_eq!(p.extract(), Some(Value::Literal("abcdef".into())));
}

#[test]
fn line_end_is_a_token_boundary() {
    let mut p = parser();
    p.feed_line("abc").unwrap();
    assert_eq!(p.extract(), Some(Value::Literal("abc".into())));
    p.feed_line("def").unwrap();
    assert_eq!(p.extract(), Some(Value::Literal("def".into())));

    // A lone quote at the end of a line opens a single-line string.
    p.feed_line("'").unwrap();
    assert_eq!(p.states().collect::<Vec<_>>(), [State::InQuotedString]);
    p.feed_line("x'").unwrap();
    assert_eq!(p.extract(), Some(Value::String("x".into())));
}

#[test]
fn quote_run_at_chunk_end_waits_for_the_decision() {
    let mut p = parser();
    p.feed("''").unwrap();
    assert_eq!(p.states().collect::<Vec<_>>(), [State::ElementStart]);
    assert_eq!(p.buffered(), 2);
    p.feed("'text'''").unwrap();
    p.seal().unwrap();
    assert_eq!(p.collect::<Vec<_>>(), [Value::String("text".into())]);

    let mut p = parser();
    p.feed("'").unwrap();
    p.feed("'").unwrap();
    p.feed(" ").unwrap();
    assert_eq!(p.extract(), Some(Value::String("".into())));
}

#[test]
fn escape_split_across_feeds() {
    let mut p = parser();
    for chunk in [r#""a\"#, "x", "4", r#"1\"#, r#"""#, r#"""#] {
        p.feed(chunk).unwrap();
    }
    p.seal().unwrap();
    assert_eq!(p.collect::<Vec<_>>(), [Value::String("aA\"".into())]);
}

#[test]
fn incomplete_hex_escape_fails_at_seal() {
    let mut p = parser();
    p.feed(r"'\x4").unwrap();
    let err = p.seal().unwrap_err();
    assert_eq!(err.kind(), SyntaxError::MalformedEscape);
    assert_eq!(err.offset(), 1);
}

#[test]
fn single_value_mode_goes_idle() {
    let mut p = StreamingParser::new(ParserOptions {
        allow_multiple_values: false,
        ..ParserOptions::default()
    });
    p.feed("[a] b").unwrap();
    assert!(p.is_idle());
    assert!(!p.is_sealed());
    assert_eq!(p.buffered(), 0);
    p.feed("] this is not parsed").unwrap();
    p.seal().unwrap();
    assert_eq!(render(&p.collect::<Vec<_>>()), ["[a]"]);
}

#[test]
fn input_after_seal_is_ignored() {
    let mut p = parser();
    p.feed("a ").unwrap();
    p.seal().unwrap();
    p.feed("b ]").unwrap();
    p.feed_line("c").unwrap();
    assert_eq!(p.seal(), Ok(()));
    assert_eq!(render(&p.collect::<Vec<_>>()), ["a"]);
}

#[test]
fn values_are_available_before_seal() {
    let mut p = parser();
    p.feed("[1] [2").unwrap();
    assert_eq!(p.queued(), 1);
    assert_eq!(p.next().map(|v| v.to_string()), Some("[1]".into()));
    assert_eq!(p.next(), None);
    p.feed("]").unwrap();
    assert_eq!(p.next().map(|v| v.to_string()), Some("[2]".into()));
}

#[test]
fn compaction_keeps_offsets_absolute() {
    let mut p = StreamingParser::new(ParserOptions {
        compact_threshold: 8,
        ..ParserOptions::default()
    });
    let mut fed = 0;
    for _ in 0..100 {
        p.feed("[item, k=v] ").unwrap();
        fed += "[item, k=v] ".len();
        assert!(p.buffered() <= 12);
    }
    // A literal spanning many feeds survives compaction.
    for _ in 0..10 {
        p.feed("long").unwrap();
        fed += 4;
    }
    let err = p.feed("]").unwrap_err();
    assert_eq!(err.offset(), fed);
    assert_eq!(p.queued(), 101);
    assert_eq!(p.by_ref().last(), Some(Value::Literal("long".repeat(10).into())));
}

#[test]
fn introspection_follows_nesting() {
    let mut p = parser();
    assert_eq!(p.depth(), 1);
    p.feed("[a, {b='''x").unwrap();
    assert_eq!(
        p.states().collect::<Vec<_>>(),
        [
            State::InAList,
            State::InAListAfterKey,
            State::InMultilineString
        ]
    );
    assert_eq!(p.depth(), 3);
    let debug = alloc::format!("{p:?}");
    assert!(debug.contains("InMultilineString"), "{debug}");
}

#[test]
fn crlf_lines() {
    let values = parse_lines("[a,\r\nb]\r\n").unwrap();
    assert_eq!(render(&values), ["[a,b]"]);
}
