//! Reads alist text from stdin line by line and prints every value.
//!
//! ```text
//! cargo run --example alist_dump < config.alist
//! cargo run --example alist_dump -- '//@' < src/main.rs
//! cargo run --example alist_dump -- '//@' '/*@' '@*/' '//@{' '//@}' < src/main.rs
//! ```
//!
//! With an argument, only the text following that marker on each line is
//! parsed, so documents embedded in comments of another file can be read.
//! Four more arguments name the markers of block regions, whose lines are
//! parsed whole, and of skip regions, whose lines are ignored.
//! Values are printed in canonical form, one per line. The first syntax error
//! is reported with the line it was found on, and the exit status is 1.
#![allow(missing_docs)]

use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
};

use alist::{
    CommentExtractor, CommentRegions, ParserError, ParserOptions, StreamingParser, Value,
};

enum Source {
    Plain(StreamingParser),
    Embedded(CommentExtractor<'static>),
}

impl Source {
    fn feed_line(&mut self, line: &[u8]) -> Result<(), ParserError> {
        match self {
            Source::Plain(parser) => parser.feed_line(line),
            Source::Embedded(extractor) => extractor.feed_line(line).map(drop),
        }
    }

    fn seal(&mut self) -> Result<(), ParserError> {
        match self {
            Source::Plain(parser) => parser.seal(),
            Source::Embedded(extractor) => extractor.seal(),
        }
    }

    fn extract(&mut self) -> Option<Value> {
        match self {
            Source::Plain(parser) => parser.extract(),
            Source::Embedded(extractor) => extractor.extract(),
        }
    }
}

fn drain(source: &mut Source, out: &mut impl Write) -> io::Result<()> {
    while let Some(value) = source.extract() {
        out.write_all(&value.to_source())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let parser = StreamingParser::new(ParserOptions::default());
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut source = match args.as_slice() {
        [] => Source::Plain(parser),
        [marker] => Source::Embedded(CommentExtractor::new(marker, parser)),
        [marker, block_start, block_end, skip_start, skip_end] => {
            let regions = CommentRegions::new(block_start, block_end, skip_start, skip_end);
            Source::Embedded(CommentExtractor::new(marker, parser).with_regions(regions))
        }
        _ => {
            eprintln!("usage: alist_dump [MARKER [BLOCK_START BLOCK_END SKIP_START SKIP_END]]");
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut line_no = 0;

    for line in stdin.lock().split(b'\n') {
        let mut line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("error reading input: {err}");
                return ExitCode::FAILURE;
            }
        };
        line_no += 1;
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        let fed = source.feed_line(&line);
        if drain(&mut source, &mut out).is_err() {
            return ExitCode::FAILURE;
        }
        if let Err(err) = fed {
            eprintln!("line {line_no}: {err}");
            return ExitCode::FAILURE;
        }
    }

    let sealed = source.seal();
    if drain(&mut source, &mut out).is_err() {
        return ExitCode::FAILURE;
    }
    match sealed {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("end of input: {err}");
            ExitCode::FAILURE
        }
    }
}
