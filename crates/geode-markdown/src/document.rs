//! Document byte buffer and line slicing.
//!
//! A [`Document`] owns one growable buffer. The source text comes first;
//! regions derived during parsing (callout bodies with their quote markers
//! stripped, text with inline placeholders) are appended behind it. Nodes
//! refer to text through [`Segment`]s into that buffer.

use crate::ast::TextValue;

/// Half-open byte range into a [`Document`] buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// Parsed unit: source text plus derived regions.
#[derive(Clone, Debug)]
pub struct Document {
    buf: String,
    source_len: usize,
}

impl Document {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            buf: source.to_owned(),
            source_len: source.len(),
        }
    }

    /// The original source region.
    #[must_use]
    pub fn source(&self) -> Segment {
        Segment::new(0, self.source_len)
    }

    /// Original source text.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.buf[..self.source_len]
    }

    #[must_use]
    pub fn slice(&self, segment: Segment) -> &str {
        &self.buf[segment.start..segment.end]
    }

    /// Resolve a text payload against this buffer.
    #[must_use]
    pub fn text<'a>(&'a self, value: &'a TextValue) -> &'a str {
        match value {
            TextValue::Segment(segment) => self.slice(*segment),
            TextValue::Owned(text) => text,
        }
    }

    /// Append a derived region and return its range.
    pub fn append(&mut self, text: &str) -> Segment {
        let start = self.buf.len();
        self.buf.push_str(text);
        Segment::new(start, self.buf.len())
    }
}

/// One line of a region, without its terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
    /// Absolute offset of `text` in the document buffer.
    pub start: usize,
    /// Absolute offset just past the line terminator.
    pub end: usize,
}

impl<'a> Line<'a> {
    /// Absolute range of the line content.
    #[must_use]
    pub fn segment(&self) -> Segment {
        Segment::new(self.start, self.start + self.text.len())
    }

    /// Absolute range of `self.text[from..to]`.
    #[must_use]
    pub fn sub_segment(&self, from: usize, to: usize) -> Segment {
        Segment::new(self.start + from, self.start + to)
    }

    /// The rest of the line starting at byte `from`.
    #[must_use]
    pub fn tail(&self, from: usize) -> Line<'a> {
        Line {
            text: &self.text[from..],
            start: self.start + from,
            end: self.end,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split `text` (located at absolute offset `base`) into lines.
pub(crate) fn lines(text: &str, base: usize) -> impl Iterator<Item = Line<'_>> {
    let mut offset = base;
    text.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        Line {
            text: raw.trim_end_matches(['\n', '\r']),
            start,
            end: offset,
        }
    })
}

/// Indentation width (tabs expand to the next multiple of 4) and the byte
/// position of the first non-indent character.
pub(crate) fn indent_width(text: &str) -> (usize, usize) {
    let mut width = 0;
    for (pos, byte) in text.bytes().enumerate() {
        match byte {
            b' ' => width += 1,
            b'\t' => width += 4 - width % 4,
            _ => return (width, pos),
        }
    }
    (width, text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_returns_new_region() {
        let mut doc = Document::new("abc");
        let seg = doc.append("xyz");
        assert_eq!(seg, Segment::new(3, 6));
        assert_eq!(doc.slice(seg), "xyz");
        assert_eq!(doc.source_text(), "abc");
    }

    #[test]
    fn test_lines_track_absolute_offsets() {
        let collected: Vec<_> = lines("a\r\nbc\nd", 10).collect();
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0].text, "a");
        assert_eq!(collected[0].end, 13);
        assert_eq!(collected[1].text, "bc");
        assert_eq!(collected[1].start, 13);
        assert_eq!(collected[2].text, "d");
        assert_eq!(collected[2].end, 17);
    }

    #[test]
    fn test_indent_width_expands_tabs() {
        assert_eq!(indent_width("   > x"), (3, 3));
        assert_eq!(indent_width("\t> x"), (4, 1));
        assert_eq!(indent_width("  \tx"), (4, 3));
        assert_eq!(indent_width("    "), (4, 4));
    }

    #[test]
    fn test_line_tail_keeps_offsets() {
        let line = Line {
            text: "see [[x]]",
            start: 5,
            end: 15,
        };
        let tail = line.tail(4);
        assert_eq!(tail.text, "[[x]]");
        assert_eq!(tail.start, 9);
        assert_eq!(tail.sub_segment(2, 3), Segment::new(11, 12));
    }
}
