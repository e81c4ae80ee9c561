//! Block scanner.
//!
//! Walks the lines of a region and offers each line to the extension block
//! parsers registered for its first non-indent byte. Lines no extension
//! claims accumulate into a run that the base engine parses as a whole.

use crate::ast::{Ast, NodeId};
use crate::document::{Document, Line, Segment, indent_width, lines};
use crate::extension::Continuation;
use crate::markdown::Markdown;

use super::base;
use super::fence::FenceTracker;

/// Parse `region` as block content and append the result under `parent`.
pub(crate) fn parse_blocks(
    md: &Markdown,
    doc: &mut Document,
    ast: &mut Ast,
    region: Segment,
    parent: NodeId,
) {
    Scanner { md, doc, ast }.scan(region, parent);
}

/// What the base-engine run collected so far has left open.
///
/// Extension blocks respect it the way the base engine would: a `>` line
/// directly under an ordinary quote continues that quote, and indented
/// lines under a list item belong to the item.
#[derive(Debug, Default)]
struct RunContext {
    paragraph: bool,
    quote: bool,
    list: bool,
    after_blank: bool,
}

impl RunContext {
    fn allows_extension(&self, line: &Line<'_>) -> bool {
        let (indent, pos) = indent_width(line.text);
        let rest = &line.text[pos..];
        !(self.quote && rest.starts_with('>')) && !(self.list && indent > 0)
    }

    fn observe(&mut self, line: &Line<'_>, code: bool) {
        if code {
            self.paragraph = false;
            self.after_blank = false;
            return;
        }
        if line.is_blank() {
            self.paragraph = false;
            self.quote = false;
            self.after_blank = true;
            return;
        }

        let (indent, pos) = indent_width(line.text);
        let rest = &line.text[pos..];
        if indent <= 3 && rest.starts_with('>') {
            self.quote = true;
        }
        if indent <= 3 && starts_list_item(rest) {
            self.list = true;
        } else if indent == 0 && self.after_blank {
            self.list = false;
        }
        self.paragraph = !(indent <= 3 && rest.starts_with('#'));
        self.after_blank = false;
    }
}

/// Bullet (`-`, `*`, `+`) or ordered (`1.`, `1)`) list marker followed by a
/// space or end of line.
fn starts_list_item(text: &str) -> bool {
    let bytes = text.as_bytes();
    let marker_end = match bytes.first() {
        Some(b'-' | b'*' | b'+') => 1,
        Some(b'0'..=b'9') => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 || !matches!(bytes.get(digits), Some(b'.' | b')')) {
                return false;
            }
            digits + 1
        }
        _ => return false,
    };
    matches!(bytes.get(marker_end), None | Some(b' ' | b'\t'))
}

struct Scanner<'a> {
    md: &'a Markdown,
    doc: &'a mut Document,
    ast: &'a mut Ast,
}

impl Scanner<'_> {
    fn scan(&mut self, region: Segment, parent: NodeId) {
        let text = self.doc.slice(region).to_owned();
        let lines: Vec<Line<'_>> = lines(&text, region.start).collect();

        let mut fence = FenceTracker::new();
        let mut context = RunContext::default();
        let mut run: Option<Segment> = None;
        let mut index = 0;

        while let Some(line) = lines.get(index) {
            if !fence.in_fence()
                && context.allows_extension(line)
                && let Some(next) = self.try_extension(parent, &lines, index, &context, &mut run)
            {
                index = next;
                context = RunContext::default();
                continue;
            }

            let state = fence.observe(line.text);
            context.observe(line, state.is_code());
            run = Some(match run {
                Some(pending) => Segment::new(pending.start, line.end),
                None => Segment::new(line.start, line.end),
            });
            index += 1;
        }

        if let Some(pending) = run {
            base::parse_run(self.md, self.doc, self.ast, parent, pending);
        }
    }

    /// Offer `lines[index]` to the extension block parsers. On a match, the
    /// block is built and the index of the first line after it is returned.
    fn try_extension(
        &mut self,
        parent: NodeId,
        lines: &[Line<'_>],
        index: usize,
        context: &RunContext,
        run: &mut Option<Segment>,
    ) -> Option<usize> {
        let md = self.md;
        let line = &lines[index];
        let (indent, pos) = indent_width(line.text);
        let first = *line.text.as_bytes().get(pos)?;

        for &candidate in &md.block_dispatch[usize::from(first)] {
            let parser = &md.block_parsers[candidate];
            if indent > 3 && !parser.can_accept_indented_line() {
                continue;
            }
            if context.paragraph && !parser.can_interrupt_paragraph() {
                continue;
            }
            let Some(start) = parser.open(self.ast, line) else {
                continue;
            };

            if let Some(pending) = run.take() {
                base::parse_run(md, self.doc, self.ast, parent, pending);
            }
            self.ast.append_child(parent, start.node);

            let mut body = String::new();
            if let Some(remainder) = start.remainder {
                push_line(&mut body, self.doc.slice(remainder));
            }
            let mut next = index + 1;
            while let Some(line) = lines.get(next) {
                match parser.continue_line(self.ast, start.node, line) {
                    Continuation::Continue(segment) => {
                        push_line(&mut body, self.doc.slice(segment));
                        next += 1;
                    }
                    Continuation::Close => break,
                }
            }

            if !body.is_empty() {
                let children = self.doc.append(&body);
                self.scan(children, start.node);
            }
            parser.close(self.ast, start.node);
            return Some(next);
        }
        None
    }
}

fn push_line(body: &mut String, line: &str) {
    body.push_str(line);
    body.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Line<'_> {
        Line {
            text,
            start: 0,
            end: text.len() + 1,
        }
    }

    #[test]
    fn test_list_item_markers() {
        assert!(starts_list_item("- item"));
        assert!(starts_list_item("* item"));
        assert!(starts_list_item("12. item"));
        assert!(starts_list_item("3) item"));
        assert!(starts_list_item("-"));
        assert!(!starts_list_item("-item"));
        assert!(!starts_list_item("2024 was a year"));
        assert!(!starts_list_item("> quote"));
    }

    #[test]
    fn test_quote_blocks_nested_markers() {
        let mut context = RunContext::default();
        context.observe(&line("> plain quote"), false);
        assert!(!context.allows_extension(&line("> [!note]")));
        assert!(context.allows_extension(&line("text")));

        context.observe(&line(""), false);
        assert!(context.allows_extension(&line("> [!note]")));
    }

    #[test]
    fn test_list_keeps_indented_lines() {
        let mut context = RunContext::default();
        context.observe(&line("- item"), false);
        assert!(!context.allows_extension(&line("  > [!note]")));
        assert!(context.allows_extension(&line("> [!note]")));

        context.observe(&line(""), false);
        context.observe(&line("paragraph"), false);
        assert!(context.allows_extension(&line("  > [!note]")));
    }

    #[test]
    fn test_paragraph_tracking() {
        let mut context = RunContext::default();
        context.observe(&line("running text"), false);
        assert!(context.paragraph);
        context.observe(&line("# heading"), false);
        assert!(!context.paragraph);
        context.observe(&line("code"), true);
        assert!(!context.paragraph);
    }
}
