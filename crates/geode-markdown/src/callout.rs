//! Admonition blocks (`> [!type]`).
//!
//! ```text
//! > [!warning]- Mind the gap
//! > Body text, parsed as ordinary block content.
//! ```
//!
//! The marker line sets the type, an optional fold state (`+` expanded,
//! `-` collapsed) and an optional title. Every following `>` line belongs to
//! the callout; its content ends up in a [`NodeValue::CalloutContent`] node
//! next to the [`NodeValue::CalloutTitle`].
//!
//! Markers are only recognized at block level. A `> [!note]` inside a list
//! item is handed to the base engine untouched and renders as an ordinary
//! quote.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Ast, Callout, CalloutTitle, NodeId, NodeKind, NodeValue};
use crate::document::{Line, indent_width};
use crate::extension::{BlockParser, BlockStart, Continuation, Extension, NodeRenderer, WalkStatus};
use crate::markdown::MarkdownBuilder;
use crate::render::RenderContext;

/// Priority of the callout parser and renderer.
pub const CALLOUT_PRIORITY: u32 = 10;

static CALLOUT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[!([a-zA-Z0-9-]+)\]([+-])?(?:[ \t]+(.*))?$").unwrap());

/// Capitalize the first letter of every alphanumeric word.
///
/// ```
/// use geode_markdown::callout::title_case;
///
/// assert_eq!(title_case("see-also"), "See-Also");
/// ```
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

/// Position just past the `>` marker and one optional following space or
/// tab, or `None` if the line is not a quote line.
fn quote_content_start(line: &Line<'_>, allow_tab: bool) -> Option<usize> {
    let (indent, pos) = indent_width(line.text);
    if indent > 3 || line.text.as_bytes().get(pos) != Some(&b'>') {
        return None;
    }
    let next = pos + 1;
    let skip = match line.text.as_bytes().get(next) {
        Some(b' ') => 1,
        Some(b'\t') if allow_tab => 1,
        _ => 0,
    };
    Some(next + skip)
}

#[derive(Debug, Default)]
pub struct CalloutParser;

impl BlockParser for CalloutParser {
    fn trigger(&self) -> &[u8] {
        b">"
    }

    fn open(&self, ast: &mut Ast, line: &Line<'_>) -> Option<BlockStart> {
        let content_start = quote_content_start(line, false)?;
        let marker = line.text[content_start..].trim_end_matches(['\r', '\n']);
        let captures = CALLOUT_MARKER.captures(marker)?;

        let callout_type = captures[1].to_lowercase();
        let fold = captures.get(2).map(|m| m.as_str());
        let title = captures
            .get(3)
            .map(|m| (m.start(), m.as_str().trim_end()))
            .filter(|(_, text)| !text.is_empty());

        let node = ast.alloc(NodeValue::Callout(Callout {
            callout_type: callout_type.clone(),
            collapsible: fold.is_some(),
            collapsed: fold == Some("-"),
        }));

        let title_node = match title {
            Some((offset, text)) => {
                let title_node = ast.alloc(NodeValue::CalloutTitle(CalloutTitle::default()));
                let paragraph = ast.alloc(NodeValue::Paragraph);
                let start = content_start + offset;
                let pending = ast.alloc(NodeValue::PendingInline(
                    line.sub_segment(start, start + text.len()),
                ));
                ast.append_child(paragraph, pending);
                ast.append_child(title_node, paragraph);
                title_node
            }
            None => ast.alloc(NodeValue::CalloutTitle(CalloutTitle {
                default_title: Some(title_case(&callout_type)),
            })),
        };
        ast.append_child(node, title_node);

        Some(BlockStart {
            node,
            remainder: None,
        })
    }

    fn continue_line(&self, _ast: &Ast, _node: NodeId, line: &Line<'_>) -> Continuation {
        match quote_content_start(line, true) {
            Some(start) => Continuation::Continue(line.sub_segment(start, line.text.len())),
            None => Continuation::Close,
        }
    }

    fn close(&self, ast: &mut Ast, node: NodeId) {
        let Some(title) = ast
            .first_child(node)
            .filter(|&child| ast.kind(child) == NodeKind::CalloutTitle)
        else {
            return;
        };
        let content = ast.alloc(NodeValue::CalloutContent);
        ast.reparent_after(node, title, content);
        ast.append_child(node, content);
    }

    fn can_interrupt_paragraph(&self) -> bool {
        true
    }

    fn can_accept_indented_line(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct CalloutRenderer;

impl NodeRenderer for CalloutRenderer {
    fn kinds(&self) -> &[NodeKind] {
        &[NodeKind::Callout, NodeKind::CalloutTitle, NodeKind::CalloutContent]
    }

    fn render(&self, ctx: &mut RenderContext<'_>, node: NodeId, entering: bool) -> WalkStatus {
        let ast = ctx.ast;
        match ast.value(node) {
            NodeValue::Callout(callout) => {
                if !entering {
                    ctx.push_str("</blockquote>\n");
                    return WalkStatus::Continue;
                }
                ctx.push_str(r#"<blockquote class="callout "#);
                ctx.push_escaped(&callout.callout_type);
                if callout.collapsible {
                    ctx.push_str(" is-collapsible");
                }
                if callout.collapsed {
                    ctx.push_str(" is-collapsed");
                }
                ctx.push_str(r#"" data-callout=""#);
                ctx.push_escaped(&callout.callout_type);
                ctx.push_str("\"");
                if callout.collapsible {
                    ctx.push_str(" data-callout-fold");
                }
                ctx.push_str(">\n");
            }
            NodeValue::CalloutTitle(title) => {
                let Some(NodeValue::Callout(callout)) = ast.parent(node).map(|p| ast.value(p)) else {
                    return WalkStatus::Continue;
                };
                if entering {
                    ctx.push_str("<div class=\"callout-title\">\n");
                    ctx.push_str("<div class=\"callout-icon\"></div>\n");
                    ctx.push_str("<div class=\"callout-title-inner\">");
                    if let Some(default_title) = &title.default_title {
                        ctx.push_str("<p>");
                        ctx.push_escaped(default_title);
                        ctx.push_str("</p>");
                    }
                } else {
                    ctx.push_str("</div>\n");
                    if callout.collapsible {
                        ctx.push_str("<div class=\"fold-callout-icon\"></div>");
                    }
                    ctx.push_str("\n</div>\n");
                }
            }
            NodeValue::CalloutContent => {
                ctx.push_str(if entering {
                    "<div class=\"callout-content\">\n"
                } else {
                    "</div>\n"
                });
            }
            _ => {}
        }
        WalkStatus::Continue
    }
}

/// Registers [`CalloutParser`] and [`CalloutRenderer`].
#[derive(Debug, Default)]
pub struct CalloutExtension;

impl Extension for CalloutExtension {
    fn extend(self, builder: &mut MarkdownBuilder) {
        builder
            .block_parser(CalloutParser, CALLOUT_PRIORITY)
            .renderer(CalloutRenderer, CALLOUT_PRIORITY);
    }
}
