//! Finds a previously rendered annotation block in file text.
//!
//! Only the two canonical places are scanned: the leading run of comment
//! lines and the trailing run. A block must open with the header line and
//! close with a bare comment line; anything else is not ours.

use std::ops::Range;

use crate::render::{FOREIGN_KEYS_TITLE, INDEXES_TITLE, TABLE_NAME_LABEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingPosition {
    None,
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub position: ExistingPosition,
    /// Byte range of the block, including its final newline.
    pub span: Range<usize>,
}

impl Location {
    pub fn none() -> Self {
        Self {
            position: ExistingPosition::None,
            span: 0..0,
        }
    }

    pub fn present(&self) -> bool {
        self.position != ExistingPosition::None
    }
}

struct Line<'a> {
    start: usize,
    end: usize,
    content: &'a str,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for raw in text.split_inclusive('\n') {
        let end = start + raw.len();
        let content = raw
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(raw);
        lines.push(Line {
            start,
            end,
            content,
        });
        start = end;
    }
    lines
}

struct Markers<'a> {
    prefix: &'a str,
    header_line: String,
}

impl<'a> Markers<'a> {
    fn new(header: &str, prefix: &'a str) -> Self {
        Self {
            prefix,
            header_line: format!("{} {}", prefix, header),
        }
    }

    fn is_block_line(&self, line: &str) -> bool {
        line == self.prefix
            || line
                .strip_prefix(self.prefix)
                .is_some_and(|rest| rest.starts_with(' '))
    }

    fn is_bare(&self, line: &str) -> bool {
        line == self.prefix
    }

    fn is_header(&self, line: &str) -> bool {
        line.trim_end() == self.header_line
    }

    // Text after "{prefix} " on a non-bare block line.
    fn text<'l>(&self, line: &'l str) -> Option<&'l str> {
        line.strip_prefix(self.prefix)?.strip_prefix(' ')
    }

    fn is_section_title(&self, line: &str) -> bool {
        self.text(line).is_some_and(|text| {
            let text = text.trim_end();
            text.starts_with(TABLE_NAME_LABEL) || text == INDEXES_TITLE || text == FOREIGN_KEYS_TITLE
        })
    }

    /// Column, index and foreign key lines carry one extra space of indent.
    fn is_body(&self, line: &str) -> bool {
        self.text(line)
            .is_some_and(|text| text.starts_with(' ') && !text.trim().is_empty())
    }
}

/// Locate the block opened by `header` in `text`.
pub fn locate(text: &str, header: &str, prefix: &str) -> Location {
    let lines = split_lines(text);
    let markers = Markers::new(header, prefix);

    if let Some(span) = locate_leading(&lines, &markers) {
        tracing::debug!(start = span.start, end = span.end, "Found leading annotation");
        return Location {
            position: ExistingPosition::Before,
            span,
        };
    }

    if let Some(span) = locate_trailing(&lines, &markers) {
        tracing::debug!(start = span.start, end = span.end, "Found trailing annotation");
        return Location {
            position: ExistingPosition::After,
            span,
        };
    }

    Location::none()
}

fn locate_leading(lines: &[Line<'_>], markers: &Markers<'_>) -> Option<Range<usize>> {
    let first = lines.first()?;
    if !markers.is_header(first.content) {
        return None;
    }

    let close = leading_block_end(lines, markers)?;
    Some(first.start..lines[close].end)
}

/// Index of the bare line closing a block whose header is `lines[0]`.
///
/// Follows the rendered layout: a bare line, then sections shaped
/// `[title, bare,] body lines, bare`. Only the first section may lack a
/// title. The first line fitting none of this ends the block, so comments
/// the file itself starts with are never taken for part of it.
fn leading_block_end(lines: &[Line<'_>], markers: &Markers<'_>) -> Option<usize> {
    let is_bare = |i: usize| lines.get(i).is_some_and(|l| markers.is_bare(l.content));
    let is_title = |i: usize| {
        lines
            .get(i)
            .is_some_and(|l| markers.is_section_title(l.content))
    };
    let is_body = |i: usize| lines.get(i).is_some_and(|l| markers.is_body(l.content));

    if !is_bare(1) {
        return None;
    }
    let mut close = 1;
    let mut first_section = true;

    loop {
        let mut i = close + 1;
        if is_title(i) {
            if !is_bare(i + 1) {
                return (!first_section).then_some(close);
            }
            i += 2;
        } else if !(first_section && is_body(i)) {
            return Some(close);
        }

        let body_start = i;
        while is_body(i) {
            i += 1;
        }
        if i == body_start || !is_bare(i) {
            // A broken first section means the block never closed.
            return (!first_section).then_some(close);
        }

        close = i;
        first_section = false;
    }
}

fn locate_trailing(lines: &[Line<'_>], markers: &Markers<'_>) -> Option<Range<usize>> {
    let close = lines
        .iter()
        .rposition(|line| !line.content.trim().is_empty())?;
    if !markers.is_bare(lines[close].content) {
        return None;
    }

    let mut open = close;
    while open > 0 && markers.is_block_line(lines[open - 1].content) {
        open -= 1;
    }

    let header = (open..close).find(|&i| markers.is_header(lines[i].content))?;
    Some(lines[header].start..lines[close].end)
}
