//! Host document scanner
//!
//! Finds macro annotations in a markup document. An annotation is a run of
//! comment lines starting with the configured marker, the first of which
//! opens an expression:
//!
//! ```text
//!   % (begin! itemize          <- opens the block, column 2
//!   %   (item! "first"))       <- continuation, brackets balanced here
//!   Ordinary text              <- copied through
//! ```
//!
//! The scanner only delimits blocks. Parsing happens per block later, so a
//! block with a stray closer still scans and fails in the parser.

use tracing::trace;

use crate::config::ExpanderConfig;
use crate::errors::ScanError;

// =============================================================================
// TYPES
// =============================================================================

/// One annotated region of the host document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroBlock {
    /// 1-based line of the opening annotation
    pub start_line: usize,
    /// 1-based line of the last annotation line
    pub end_line: usize,
    /// Column of the marker on the opening line, tabs expanded
    pub column: usize,
    /// Annotation lines exactly as they appear in the document
    pub lines: Vec<String>,
    /// Expression source: text after the marker on each line, joined by `\n`
    pub source: String,
}

impl MacroBlock {
    /// `(level, base_indentation)` for a given indent width
    pub fn layout(&self, indent_width: usize) -> (usize, usize) {
        let width = indent_width.max(1);
        (self.column / width, self.column % width)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Document line copied through unchanged, without its newline
    Line(&'a str),
    Block(MacroBlock),
}

// =============================================================================
// SCANNER
// =============================================================================

pub struct Scanner<'c> {
    marker: &'c str,
    tab_width: usize,
    string_aware: bool,
}

impl<'c> Scanner<'c> {
    pub fn new(config: &'c ExpanderConfig) -> Self {
        Self {
            marker: &config.marker,
            tab_width: config.indent_width.max(1),
            string_aware: config.string_aware_scanning,
        }
    }

    /// Split `document` into pass-through lines and macro blocks
    pub fn scan<'a>(&self, document: &'a str) -> Result<Vec<Segment<'a>>, ScanError> {
        let mut segments = Vec::new();
        let mut lines = document.lines().enumerate().peekable();

        while let Some((index, line)) = lines.next() {
            let Some((indent, body)) = self.opening(line) else {
                segments.push(Segment::Line(line));
                continue;
            };

            let start_line = index + 1;
            let mut counter = BracketCounter::new(self.string_aware);
            counter.feed(body);

            let mut block = MacroBlock {
                start_line,
                end_line: start_line,
                column: self.column_of(indent),
                lines: vec![line.to_string()],
                source: body.to_string(),
            };

            while counter.is_open() {
                let continuation = lines
                    .peek()
                    .and_then(|&(_, next)| self.continuation(next).map(|body| (next, body)));
                let Some((next, body)) = continuation else {
                    return Err(ScanError::Unterminated {
                        line: start_line,
                        depth: counter.depth(),
                    });
                };
                counter.feed(body);
                block.source.push('\n');
                block.source.push_str(body);
                block.lines.push(next.to_string());
                block.end_line += 1;
                lines.next();
            }

            trace!(
                start = block.start_line,
                end = block.end_line,
                column = block.column,
                "found macro block"
            );
            segments.push(Segment::Block(block));
        }

        Ok(segments)
    }

    /// Leading whitespace and expression text of a line that opens a block
    fn opening<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];
        let body = trimmed.strip_prefix(self.marker)?;
        body.trim_start()
            .starts_with(['(', '['])
            .then_some((indent, body))
    }

    /// Display width of leading whitespace. A tab advances to the next
    /// multiple of the indent width.
    fn column_of(&self, indent: &str) -> usize {
        indent.chars().fold(0, |column, c| match c {
            '\t' => (column / self.tab_width + 1) * self.tab_width,
            _ => column + 1,
        })
    }

    /// Expression text of an annotation continuation line
    fn continuation<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.trim_start().strip_prefix(self.marker)
    }
}

/// Convenience wrapper over [`Scanner::scan`]
pub fn scan<'a>(document: &'a str, config: &ExpanderConfig) -> Result<Vec<Segment<'a>>, ScanError> {
    Scanner::new(config).scan(document)
}

// =============================================================================
// BRACKET COUNTING
// =============================================================================

/// Running `(`/`[` depth across the lines of one block.
///
/// In raw mode every bracket counts. In string-aware mode brackets inside
/// string literals and `;` comments are skipped, and an open string carries
/// over to the next line.
struct BracketCounter {
    depth: i64,
    string_aware: bool,
    in_string: bool,
    escaped: bool,
}

impl BracketCounter {
    fn new(string_aware: bool) -> Self {
        Self {
            depth: 0,
            string_aware,
            in_string: false,
            escaped: false,
        }
    }

    fn feed(&mut self, text: &str) {
        for c in text.chars() {
            if self.string_aware {
                if self.in_string {
                    match c {
                        _ if self.escaped => self.escaped = false,
                        '\\' => self.escaped = true,
                        '"' => self.in_string = false,
                        _ => {}
                    }
                    continue;
                }
                match c {
                    '"' => {
                        self.in_string = true;
                        continue;
                    }
                    ';' => break,
                    _ => {}
                }
            }
            match c {
                '(' | '[' => self.depth += 1,
                ')' | ']' => self.depth -= 1,
                _ => {}
            }
        }
    }

    fn is_open(&self) -> bool {
        self.depth > 0
    }

    fn depth(&self) -> usize {
        self.depth.max(0) as usize
    }
}

// =============================================================================
// TESTS
// =============================================================================
