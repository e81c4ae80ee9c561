//! Inline extension support.
//!
//! The base engine knows nothing about extension inline syntax, so matches
//! are found first and replaced with private-use placeholders. The engine
//! sees an opaque run of characters; the tree builder swaps each placeholder
//! back for the node the extension produced, or for the original text where
//! the placeholder landed in code or raw HTML.

use std::borrow::Cow;

use crate::ast::{Ast, NodeId, NodeKind, NodeValue, TextValue};
use crate::document::{Document, Line, Segment, lines};
use crate::extension::InlineMatch;
use crate::markdown::Markdown;

use super::base;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';
const DIGIT_ZERO: u32 = 0xE010;

/// A matched inline span replaced by a placeholder.
#[derive(Debug)]
struct Substitution {
    node: NodeId,
    literal: String,
}

/// Placeholder-substituted text and the spans it stands for.
#[derive(Debug, Default)]
pub(super) struct Substitutions {
    /// Substituted text, or `None` when nothing matched.
    pub(super) text: Option<String>,
    spans: Vec<Substitution>,
}

impl Substitutions {
    /// Placeholders in `text` as `(start, end, node)` byte ranges.
    pub(super) fn find_in(&self, text: &str) -> Vec<(usize, usize, NodeId)> {
        self.locate(text)
            .into_iter()
            .map(|(start, end, span)| (start, end, span.node))
            .collect()
    }

    fn locate(&self, text: &str) -> Vec<(usize, usize, &Substitution)> {
        if self.spans.is_empty() {
            return Vec::new();
        }
        text.match_indices(OPEN)
            .filter_map(|(start, _)| {
                let (index, end) = read_placeholder(text, start)?;
                Some((start, end, self.spans.get(index)?))
            })
            .collect()
    }

    /// Replace every placeholder in `text` with the source it stands for.
    pub(super) fn restore<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let found = self.locate(text);
        if found.is_empty() {
            return Cow::Borrowed(text);
        }
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        for (start, end, span) in found {
            out.push_str(&text[copied..start]);
            out.push_str(&span.literal);
            copied = end;
        }
        out.push_str(&text[copied..]);
        Cow::Owned(out)
    }
}

fn push_placeholder(out: &mut String, index: usize) {
    out.push(OPEN);
    for digit in index.to_string().bytes() {
        let offset = u32::from(digit - b'0');
        if let Some(ch) = char::from_u32(DIGIT_ZERO + offset) {
            out.push(ch);
        }
    }
    out.push(CLOSE);
}

/// Decode the placeholder starting at byte `start`, returning its span index
/// and the byte just past it.
fn read_placeholder(text: &str, start: usize) -> Option<(usize, usize)> {
    let mut chars = text[start..].char_indices();
    if chars.next()?.1 != OPEN {
        return None;
    }
    let mut index: usize = 0;
    let mut digits = 0;
    for (offset, ch) in chars {
        if ch == CLOSE {
            return (digits > 0).then_some((index, start + offset + ch.len_utf8()));
        }
        let digit = u32::from(ch).checked_sub(DIGIT_ZERO).filter(|d| *d < 10)?;
        index = index.checked_mul(10)?.checked_add(usize::try_from(digit).ok()?)?;
        digits += 1;
    }
    None
}

/// Scan `source` (located at absolute offset `base`) for inline extension
/// matches and substitute placeholders for them.
///
/// Backslash-escaped punctuation is skipped, so `\[[x]]` stays literal.
/// Code spans, autolinks and raw HTML tags bind tighter than extension
/// syntax and are skipped whole.
pub(super) fn substitute(md: &Markdown, ast: &mut Ast, source: &str, base: usize) -> Substitutions {
    if md.inline_parsers.is_empty() {
        return Substitutions::default();
    }

    let mut out = String::new();
    let mut copied = 0;
    let mut spans = Vec::new();

    // A code span may run past the end of the line it opens on.
    let mut skip_to: usize = 0;

    for line in lines(source, base) {
        let bytes = line.text.as_bytes();
        let offset = line.start - base;
        let mut pos = skip_to.saturating_sub(offset).min(bytes.len());
        while pos < bytes.len() {
            let byte = bytes[pos];
            if byte == b'\\' && bytes.get(pos + 1).is_some_and(u8::is_ascii_punctuation) {
                pos += 2;
                continue;
            }
            if byte == b'`' {
                skip_to = code_span_end(source, offset + pos);
                pos = (skip_to - offset).min(bytes.len());
                continue;
            }
            if byte == b'<'
                && let Some(end) = angle_span_end(line.text, pos)
            {
                pos = end;
                continue;
            }
            if let Some(found) = try_inline(md, ast, &line.tail(pos)) {
                let start = line.start - base + pos;
                let end = start + found.consumed;
                out.push_str(&source[copied..start]);
                push_placeholder(&mut out, spans.len());
                spans.push(Substitution {
                    node: found.node,
                    literal: source[start..end].to_owned(),
                });
                copied = end;
                pos += found.consumed;
                continue;
            }
            pos += line.text[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }

    if spans.is_empty() {
        return Substitutions::default();
    }
    out.push_str(&source[copied..]);
    Substitutions {
        text: Some(out),
        spans,
    }
}

/// End of the code span whose opening backtick run starts at `pos`. When no
/// closing run of the same length follows within the paragraph, the opening
/// run is literal and only it is skipped.
fn code_span_end(source: &str, pos: usize) -> usize {
    let bytes = source.as_bytes();
    let run = bytes[pos..].iter().take_while(|&&b| b == b'`').count();
    let open_end = pos + run;
    let limit = paragraph_end(source, open_end);
    let mut at = open_end;
    while at < limit {
        if bytes[at] != b'`' {
            at += 1;
            continue;
        }
        let close = bytes[at..limit].iter().take_while(|&&b| b == b'`').count();
        if close == run {
            return at + close;
        }
        at += close;
    }
    open_end
}

/// Offset of the first blank line after the line holding `from`.
fn paragraph_end(source: &str, from: usize) -> usize {
    let mut offset = from;
    let mut rest = source[from..].split_inclusive('\n');
    if let Some(first) = rest.next() {
        offset += first.len();
    }
    for line in rest {
        if line.trim().is_empty() {
            return offset;
        }
        offset += line.len();
    }
    source.len()
}

/// End of the autolink, HTML comment or HTML tag opening with the `<` at
/// `pos`, if one does.
fn angle_span_end(text: &str, pos: usize) -> Option<usize> {
    let rest = &text[pos + 1..];
    if let Some(body) = rest.strip_prefix("!--") {
        return body.find("-->").map(|end| pos + 4 + end + 3);
    }
    let close = rest.find(['<', '>'])?;
    if rest.as_bytes()[close] != b'>' {
        return None;
    }
    let inner = &rest[..close];
    (is_autolink(inner) || is_tag(inner)).then_some(pos + 1 + close + 1)
}

/// An open or closing tag, a declaration or a processing instruction.
fn is_tag(inner: &str) -> bool {
    if inner.starts_with(['!', '?']) {
        return inner.len() > 1;
    }
    let name = inner.strip_prefix('/').unwrap_or(inner);
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }
    let after = name.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-');
    after.is_empty() || after.starts_with(|c: char| c.is_whitespace() || c == '/')
}

/// `scheme:rest` or `user@host` with no whitespace.
fn is_autolink(inner: &str) -> bool {
    if inner.contains(char::is_whitespace) {
        return false;
    }
    match inner.split_once(':') {
        Some((scheme, _)) => {
            (2..=32).contains(&scheme.len())
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'.' | b'-'))
        }
        None => inner.contains('@'),
    }
}

fn try_inline(md: &Markdown, ast: &mut Ast, line: &Line<'_>) -> Option<InlineMatch> {
    let first = *line.text.as_bytes().first()?;
    md.inline_dispatch[usize::from(first)]
        .iter()
        .find_map(|&index| md.inline_parsers[index].parse(ast, line))
        .filter(|found| found.consumed > 0 && found.consumed <= line.text.len())
}

/// Inline-parse every [`NodeValue::PendingInline`] reachable from the root.
///
/// Each pending range goes through the base engine (and inline extensions)
/// as a standalone run. When that yields a single paragraph, its inline
/// children replace the pending node; otherwise the range is kept as plain
/// text. Expansion repeats until no pending nodes remain, since expanded
/// content can itself contain pending labels.
pub(crate) fn expand_pending(md: &Markdown, doc: &mut Document, ast: &mut Ast) {
    loop {
        let pending: Vec<(NodeId, Segment)> = ast
            .descendants(ast.root())
            .into_iter()
            .filter_map(|id| match ast.value(id) {
                NodeValue::PendingInline(segment) => Some((id, *segment)),
                _ => None,
            })
            .collect();
        if pending.is_empty() {
            break;
        }
        for (node, segment) in pending {
            expand(md, doc, ast, node, segment);
        }
    }
}

fn expand(md: &Markdown, doc: &mut Document, ast: &mut Ast, node: NodeId, segment: Segment) {
    let holder = ast.alloc(NodeValue::Group);
    base::parse_run(md, doc, ast, holder, segment);

    let blocks: Vec<NodeId> = ast.children(holder).collect();
    match blocks.as_slice() {
        [paragraph] if ast.kind(*paragraph) == NodeKind::Paragraph => {
            let inlines: Vec<NodeId> = ast.children(*paragraph).collect();
            for child in inlines {
                ast.insert_before(node, child);
            }
        }
        _ => {
            let text = ast.alloc(NodeValue::Text(TextValue::Segment(segment)));
            ast.insert_before(node, text);
        }
    }
    ast.detach(node);
}
