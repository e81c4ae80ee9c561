//! Fenced code tracking for the block scanner.
//!
//! Extension blocks must not open inside fenced code, so the scanner feeds
//! every line it hands to the base engine through a [`FenceTracker`].

use crate::document::indent_width;

/// How a line relates to fenced code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FenceLine {
    /// Ordinary line outside any fence.
    Outside,
    /// Opening fence marker.
    Open,
    /// Line inside a fence.
    Inside,
    /// Closing fence marker.
    Close,
}

impl FenceLine {
    /// Whether the line is code or a fence marker.
    pub(crate) fn is_code(self) -> bool {
        self != Self::Outside
    }
}

/// Tracks backtick and tilde fences across lines.
///
/// A closing fence uses the opening character, is at least as long as the
/// opening run and carries nothing but whitespace after it.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(u8, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Classify `line` and advance the fence state.
    pub(crate) fn observe(&mut self, line: &str) -> FenceLine {
        let (indent, pos) = indent_width(line);
        let rest = &line[pos..];

        match self.open {
            Some((marker, min_len)) => {
                if indent <= 3 && is_closing(rest, marker, min_len) {
                    self.open = None;
                    FenceLine::Close
                } else {
                    FenceLine::Inside
                }
            }
            None => match opening(rest) {
                Some(fence) if indent <= 3 => {
                    self.open = Some(fence);
                    FenceLine::Open
                }
                _ => FenceLine::Outside,
            },
        }
    }
}

fn run_length(text: &str, marker: u8) -> usize {
    text.bytes().take_while(|&b| b == marker).count()
}

fn opening(text: &str) -> Option<(u8, usize)> {
    let marker = *text.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let len = run_length(text, marker);
    // Backtick info strings may not contain backticks.
    if len < 3 || (marker == b'`' && text[len..].contains('`')) {
        return None;
    }
    Some((marker, len))
}

fn is_closing(text: &str, marker: u8, min_len: usize) -> bool {
    let len = run_length(text, marker);
    len >= min_len && text[len..].trim().is_empty()
}
