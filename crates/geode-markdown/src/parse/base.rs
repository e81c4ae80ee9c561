//! Adapter from pulldown-cmark events to the arena tree.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag};

use crate::ast::{Alignment, Ast, Link, NodeId, NodeValue, TextValue};
use crate::document::{Document, Segment};
use crate::markdown::Markdown;

use super::inline::{self, Substitutions};

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(alignment: pulldown_cmark::Alignment) -> Self {
        match alignment {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// Parse `region` with the base engine and append the blocks under `parent`.
pub(super) fn parse_run(
    md: &Markdown,
    doc: &mut Document,
    ast: &mut Ast,
    parent: NodeId,
    region: Segment,
) {
    let subs = inline::substitute(md, ast, doc.slice(region), region.start);
    let region = match &subs.text {
        Some(text) => doc.append(text),
        None => region,
    };

    let text = doc.slice(region);
    let mut builder = TreeBuilder {
        ast,
        subs: &subs,
        text,
        base: region.start,
        stack: vec![parent],
    };
    for (event, range) in Parser::new_ext(text, md.options).into_offset_iter() {
        builder.event(event, range);
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

struct TreeBuilder<'a> {
    ast: &'a mut Ast,
    subs: &'a Substitutions,
    /// Text handed to the engine; event ranges index into it.
    text: &'a str,
    /// Absolute offset of `text` in the document buffer.
    base: usize,
    /// Open containers; the bottom entry is the run's parent.
    stack: Vec<NodeId>,
}

impl TreeBuilder<'_> {
    fn top(&self) -> NodeId {
        self.stack[self.stack.len() - 1]
    }

    fn leaf(&mut self, value: NodeValue) {
        let node = self.ast.alloc(value);
        self.ast.append_child(self.top(), node);
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
            }
            Event::Text(text) => self.text(&text, range),
            Event::Code(code) => self.leaf(NodeValue::Code(self.subs.restore(&code).into_owned())),
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.leaf(NodeValue::Text(TextValue::Owned(math.into_string())));
            }
            Event::FootnoteReference(label) => {
                self.leaf(NodeValue::Text(TextValue::Owned(format!("[^{label}]"))));
            }
            Event::SoftBreak => self.leaf(NodeValue::SoftBreak),
            Event::HardBreak => self.leaf(NodeValue::HardBreak),
            Event::Rule => self.leaf(NodeValue::ThematicBreak),
            Event::TaskListMarker(checked) => self.leaf(NodeValue::TaskListMarker(checked)),
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let value = match tag {
            Tag::Paragraph => NodeValue::Paragraph,
            Tag::Heading { level, .. } => NodeValue::Heading {
                level: heading_level(level),
                id: None,
            },
            Tag::BlockQuote(_) => NodeValue::BlockQuote,
            Tag::CodeBlock(kind) => NodeValue::CodeBlock {
                info: match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => {
                        Some(self.subs.restore(&info).into_owned())
                    }
                    _ => None,
                },
                literal: String::new(),
            },
            Tag::HtmlBlock => NodeValue::HtmlBlock {
                literal: String::new(),
            },
            Tag::List(start) => NodeValue::List { start },
            Tag::Item => NodeValue::Item,
            Tag::Table(alignments) => NodeValue::Table {
                alignments: alignments.into_iter().map(Alignment::from).collect(),
            },
            Tag::TableHead => NodeValue::TableHead,
            Tag::TableRow => NodeValue::TableRow,
            Tag::TableCell => NodeValue::TableCell,
            Tag::Emphasis => NodeValue::Emphasis,
            Tag::Strong => NodeValue::Strong,
            Tag::Strikethrough => NodeValue::Strikethrough,
            Tag::Superscript => NodeValue::Superscript,
            Tag::Subscript => NodeValue::Subscript,
            Tag::Link {
                dest_url, title, ..
            } => NodeValue::Link(self.link(&dest_url, &title)),
            Tag::Image {
                dest_url, title, ..
            } => NodeValue::Image(self.link(&dest_url, &title)),
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_) => NodeValue::Group,
        };
        let node = self.ast.alloc(value);
        self.ast.append_child(self.top(), node);
        self.stack.push(node);
    }

    fn link(&self, destination: &str, title: &str) -> Link {
        Link {
            destination: self.subs.restore(destination).into_owned(),
            title: self.subs.restore(title).into_owned(),
            external: false,
        }
    }

    fn html(&mut self, html: &str) {
        let top = self.top();
        let restored = self.subs.restore(html);
        if let NodeValue::HtmlBlock { literal } = self.ast.value_mut(top) {
            literal.push_str(&restored);
        } else {
            self.leaf(NodeValue::InlineHtml(restored.into_owned()));
        }
    }

    fn text(&mut self, text: &str, range: Range<usize>) {
        let top = self.top();
        if let NodeValue::CodeBlock { literal, .. } | NodeValue::HtmlBlock { literal } =
            self.ast.value_mut(top)
        {
            literal.push_str(&self.subs.restore(text));
            return;
        }

        // Text the engine passed through unchanged stays a buffer segment.
        let verbatim = self.text.get(range.clone()) == Some(text);
        let base = self.base + range.start;
        let mut copied = 0;
        for (start, end, node) in self.subs.find_in(text) {
            self.text_piece(text, copied..start, verbatim.then_some(base));
            self.ast.append_child(top, node);
            copied = end;
        }
        self.text_piece(text, copied..text.len(), verbatim.then_some(base));
    }

    fn text_piece(&mut self, text: &str, piece: Range<usize>, base: Option<usize>) {
        if piece.is_empty() {
            return;
        }
        let value = match base {
            Some(base) => TextValue::Segment(Segment::new(base + piece.start, base + piece.end)),
            None => TextValue::Owned(text[piece].to_owned()),
        };
        self.leaf(NodeValue::Text(value));
    }
}
