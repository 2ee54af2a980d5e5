use bstr::{BString, ByteSlice};
use log::{debug, trace};

use crate::{Builder, ParserError, StdBuilder, StreamingParserImpl};

/// Parses alist documents embedded in line comments of another file.
///
/// Each line is searched for the marker; the bytes after its first occurrence
/// are fed to the parser as one line, and lines without the marker are
/// skipped entirely. With [`CommentRegions`] set, whole lines inside block
/// regions are fed as well and lines inside skip regions are ignored.
///
/// # Examples
///
/// ```
/// use alist::{CommentExtractor, ParserOptions, StreamingParser, Value};
///
/// let source = "\
/// fn main() {}
/// //@ [mode=fast,
/// let x = 1;
/// //@  level=3]
/// ";
///
/// let mut extractor =
///     CommentExtractor::new("//@", StreamingParser::new(ParserOptions::default()));
/// extractor.feed_lines(source).unwrap();
/// extractor.seal().unwrap();
///
/// let values: Vec<Value> = extractor.collect();
/// assert_eq!(values[0].to_string(), "[mode=fast,level=3]");
/// ```
#[derive(Debug)]
pub struct CommentExtractor<'g, B: Builder = StdBuilder> {
    marker: BString,
    regions: Option<CommentRegions>,
    block_level: usize,
    skip_level: usize,
    parser: StreamingParserImpl<'g, B>,
}

/// Marker lines delimiting regions of a host file.
///
/// A line containing one of these markers only changes the nesting level and
/// is never fed to the parser. Skip markers are checked first and a skip
/// region hides everything inside it, block markers included. Inside a block
/// region every line is fed unchanged. Both kinds of region nest.
///
/// # Examples
///
/// ```
/// use alist::{CommentExtractor, CommentRegions, ParserOptions, StreamingParser};
///
/// let source = "\
/// /*@
/// [a, b]
/// @*/
/// //@ c
/// ";
///
/// let regions = CommentRegions::new("/*@", "@*/", "//@{", "//@}");
/// let mut extractor =
///     CommentExtractor::new("//@", StreamingParser::new(ParserOptions::default()))
///         .with_regions(regions);
/// extractor.feed_lines(source).unwrap();
/// extractor.seal().unwrap();
///
/// let rendered: Vec<String> = extractor.map(|v| v.to_string()).collect();
/// assert_eq!(rendered, ["[a,b]", "c"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRegions {
    /// Opens a region whose lines are fed whole.
    pub block_start: BString,
    /// Closes a block region.
    pub block_end: BString,
    /// Opens a region whose lines are ignored.
    pub skip_start: BString,
    /// Closes a skip region.
    pub skip_end: BString,
}

impl CommentRegions {
    /// Regions delimited by the given marker strings.
    pub fn new(
        block_start: impl AsRef<[u8]>,
        block_end: impl AsRef<[u8]>,
        skip_start: impl AsRef<[u8]>,
        skip_end: impl AsRef<[u8]>,
    ) -> Self {
        Self {
            block_start: BString::from(block_start.as_ref()),
            block_end: BString::from(block_end.as_ref()),
            skip_start: BString::from(skip_start.as_ref()),
            skip_end: BString::from(skip_end.as_ref()),
        }
    }
}

/// What a line means to the region tracking.
enum LineRole<'a> {
    /// A region marker or a hidden line.
    Consumed,
    /// A line inside a block region.
    Whole(&'a [u8]),
    /// Anything else; look for the line marker.
    Plain,
}

impl<'g, B: Builder> CommentExtractor<'g, B> {
    /// Wrap `parser`, feeding it the text that follows `marker` on each line.
    pub fn new(marker: impl AsRef<[u8]>, parser: StreamingParserImpl<'g, B>) -> Self {
        Self {
            marker: BString::from(marker.as_ref()),
            regions: None,
            block_level: 0,
            skip_level: 0,
            parser,
        }
    }

    /// Also track block and skip regions.
    #[must_use]
    pub fn with_regions(mut self, regions: CommentRegions) -> Self {
        self.regions = Some(regions);
        self
    }

    /// Feed one line of the host file, without its line terminator.
    ///
    /// Returns whether any of the line was fed to the parser.
    ///
    /// # Errors
    ///
    /// Returns the parser's error for the embedded text.
    pub fn feed_line(&mut self, line: impl AsRef<[u8]>) -> Result<bool, ParserError> {
        let line = line.as_ref();
        match self.track_regions(line) {
            LineRole::Consumed => return Ok(false),
            LineRole::Whole(line) => {
                trace!("feeding {} byte(s) from a block region", line.len());
                self.parser.feed_line(line)?;
                return Ok(true);
            }
            LineRole::Plain => {}
        }
        let Some(at) = line.find(&self.marker) else {
            return Ok(false);
        };
        let embedded = &line[at + self.marker.len()..];
        trace!("feeding {} embedded byte(s)", embedded.len());
        self.parser.feed_line(embedded)?;
        Ok(true)
    }

    /// Feed every line of `text`, split at `\n` or `\r\n`.
    ///
    /// # Errors
    ///
    /// Stops at the first line whose embedded text fails to parse.
    pub fn feed_lines(&mut self, text: impl AsRef<[u8]>) -> Result<(), ParserError> {
        for line in text.as_ref().lines() {
            self.feed_line(line)?;
        }
        Ok(())
    }

    /// End the input; see [`StreamingParserImpl::seal`].
    ///
    /// # Errors
    ///
    /// As for [`StreamingParserImpl::seal`].
    pub fn seal(&mut self) -> Result<(), ParserError> {
        self.parser.seal()
    }

    /// Take the oldest completed value.
    pub fn extract(&mut self) -> Option<B::Value> {
        self.parser.extract()
    }

    /// The marker searched for on each line.
    #[must_use]
    pub fn marker(&self) -> &[u8] {
        &self.marker
    }

    /// The tracked regions, if any.
    #[must_use]
    pub fn regions(&self) -> Option<&CommentRegions> {
        self.regions.as_ref()
    }

    /// Current nesting of block and skip regions.
    #[must_use]
    pub fn region_levels(&self) -> (usize, usize) {
        (self.block_level, self.skip_level)
    }

    fn track_regions<'l>(&mut self, line: &'l [u8]) -> LineRole<'l> {
        let Some(regions) = &self.regions else {
            return LineRole::Plain;
        };

        if line.find(&regions.skip_start).is_some() {
            self.skip_level += 1;
            debug!("skip region opened, level {}", self.skip_level);
            return LineRole::Consumed;
        }
        if line.find(&regions.skip_end).is_some() {
            self.skip_level = self.skip_level.saturating_sub(1);
            debug!("skip region closed, level {}", self.skip_level);
            return LineRole::Consumed;
        }
        if self.skip_level > 0 {
            return LineRole::Consumed;
        }

        if line.find(&regions.block_start).is_some() {
            self.block_level += 1;
            debug!("block region opened, level {}", self.block_level);
            return LineRole::Consumed;
        }
        if line.find(&regions.block_end).is_some() {
            self.block_level = self.block_level.saturating_sub(1);
            debug!("block region closed, level {}", self.block_level);
            return LineRole::Consumed;
        }
        if self.block_level > 0 {
            return LineRole::Whole(line);
        }
        LineRole::Plain
    }

    /// The wrapped parser.
    #[must_use]
    pub fn parser(&self) -> &StreamingParserImpl<'g, B> {
        &self.parser
    }

    /// Unwrap the parser.
    #[must_use]
    pub fn into_parser(self) -> StreamingParserImpl<'g, B> {
        self.parser
    }
}

impl<B: Builder> Iterator for CommentExtractor<'_, B> {
    type Item = B::Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.extract()
    }
}
