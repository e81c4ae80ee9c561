//! Built-in HTML rules for the base node kinds.

use std::fmt::Write;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::ast::{Alignment, Link, NodeId, NodeKind, NodeValue};
use crate::extension::WalkStatus;
use crate::render::RenderContext;

/// Characters percent-encoded in `href` and `src` attributes. `%` is kept so
/// already-encoded URLs pass through unchanged.
const URL_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_html_into(s, &mut out);
    out
}

pub(crate) fn escape_html_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

/// Percent-encode a URL and escape it for use inside an attribute.
#[must_use]
pub fn escape_url(url: &str) -> String {
    escape_html(&utf8_percent_encode(url, URL_ENCODE).to_string())
}

/// Write an `<a href=...` opening tag carrying `extra` attributes verbatim.
pub fn write_link_open(out: &mut String, link: &Link, extra: &str) {
    write!(out, r#"<a href="{}""#, escape_url(&link.destination)).unwrap();
    if !link.title.is_empty() {
        write!(out, r#" title="{}""#, escape_html(&link.title)).unwrap();
    }
    out.push_str(extra);
    out.push('>');
}

fn alignment_style(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::None => "",
        Alignment::Left => r#" style="text-align: left""#,
        Alignment::Center => r#" style="text-align: center""#,
        Alignment::Right => r#" style="text-align: right""#,
    }
}

/// Alignment of a table cell, looked up from its column index.
fn cell_alignment(ctx: &RenderContext<'_>, cell: NodeId) -> Alignment {
    let ast = ctx.ast;
    let column = ast
        .parent(cell)
        .map_or(0, |row| ast.children(row).take_while(|&c| c != cell).count());
    let table = ast.parent(cell).and_then(|row| ast.parent(row));
    match table.map(|table| ast.value(table)) {
        Some(NodeValue::Table { alignments }) => {
            alignments.get(column).copied().unwrap_or(Alignment::None)
        }
        _ => Alignment::None,
    }
}

fn in_table_head(ctx: &RenderContext<'_>, cell: NodeId) -> bool {
    ctx.ast
        .parent(cell)
        .is_some_and(|parent| ctx.ast.kind(parent) == NodeKind::TableHead)
}

/// Render one node edge with the built-in rules.
#[allow(clippy::too_many_lines)]
pub(crate) fn render_node(ctx: &mut RenderContext<'_>, node: NodeId, entering: bool) -> WalkStatus {
    let ast = ctx.ast;
    match ast.value(node) {
        NodeValue::Document
        | NodeValue::Group
        | NodeValue::CalloutContent
        | NodeValue::Reference(_) => {}
        NodeValue::Paragraph => ctx.push_str(if entering { "<p>" } else { "</p>\n" }),
        NodeValue::Heading { level, id } => {
            if entering {
                match id {
                    Some(id) => write!(ctx.out, r#"<h{level} id="{}">"#, escape_html(id)).unwrap(),
                    None => write!(ctx.out, "<h{level}>").unwrap(),
                }
            } else {
                writeln!(ctx.out, "</h{level}>").unwrap();
            }
        }
        NodeValue::BlockQuote => {
            ctx.push_str(if entering { "<blockquote>\n" } else { "</blockquote>\n" });
        }
        NodeValue::List { start } => match (start, entering) {
            (None, true) => ctx.push_str("<ul>\n"),
            (None, false) => ctx.push_str("</ul>\n"),
            (Some(1), true) => ctx.push_str("<ol>\n"),
            (Some(n), true) => writeln!(ctx.out, r#"<ol start="{n}">"#).unwrap(),
            (Some(_), false) => ctx.push_str("</ol>\n"),
        },
        NodeValue::Item => ctx.push_str(if entering { "<li>" } else { "</li>\n" }),
        NodeValue::CodeBlock { info, literal } => {
            if entering {
                let lang = info
                    .as_deref()
                    .and_then(|info| info.split_whitespace().next());
                match lang {
                    Some(lang) => write!(
                        ctx.out,
                        r#"<pre><code class="language-{}">"#,
                        escape_html(lang)
                    )
                    .unwrap(),
                    None => ctx.push_str("<pre><code>"),
                }
                ctx.push_escaped(literal);
                ctx.push_str("</code></pre>\n");
            }
        }
        NodeValue::HtmlBlock { literal } => {
            if entering {
                ctx.push_str(literal);
            }
        }
        NodeValue::ThematicBreak => {
            if entering {
                ctx.push_str("<hr>\n");
            }
        }
        NodeValue::Table { .. } => {
            ctx.push_str(if entering { "<table>\n" } else { "</tbody>\n</table>\n" });
        }
        NodeValue::TableHead => {
            ctx.push_str(if entering {
                "<thead>\n<tr>\n"
            } else {
                "</tr>\n</thead>\n<tbody>\n"
            });
        }
        NodeValue::TableRow => ctx.push_str(if entering { "<tr>\n" } else { "</tr>\n" }),
        NodeValue::TableCell => {
            let tag = if in_table_head(ctx, node) { "th" } else { "td" };
            if entering {
                let style = alignment_style(cell_alignment(ctx, node));
                write!(ctx.out, "<{tag}{style}>").unwrap();
            } else {
                writeln!(ctx.out, "</{tag}>").unwrap();
            }
        }
        NodeValue::Text(text) => {
            if entering {
                let text = ctx.text(text);
                ctx.push_escaped(text);
            }
        }
        NodeValue::PendingInline(segment) => {
            if entering {
                let text = ctx.doc.slice(*segment);
                ctx.push_escaped(text);
            }
        }
        NodeValue::Code(code) => {
            if entering {
                ctx.push_str("<code>");
                ctx.push_escaped(code);
                ctx.push_str("</code>");
            }
        }
        NodeValue::Emphasis => ctx.push_str(if entering { "<em>" } else { "</em>" }),
        NodeValue::Strong => ctx.push_str(if entering { "<strong>" } else { "</strong>" }),
        NodeValue::Strikethrough => ctx.push_str(if entering { "<del>" } else { "</del>" }),
        NodeValue::Superscript => ctx.push_str(if entering { "<sup>" } else { "</sup>" }),
        NodeValue::Subscript => ctx.push_str(if entering { "<sub>" } else { "</sub>" }),
        NodeValue::Link(link) => {
            if entering {
                write_link_open(ctx.out, link, "");
            } else {
                ctx.push_str("</a>");
            }
        }
        NodeValue::Image(link) => {
            if entering {
                let alt = ctx.plain_text(node);
                write!(
                    ctx.out,
                    r#"<img src="{}" alt="{}""#,
                    escape_url(&link.destination),
                    escape_html(&alt)
                )
                .unwrap();
                if !link.title.is_empty() {
                    write!(ctx.out, r#" title="{}""#, escape_html(&link.title)).unwrap();
                }
                ctx.push_str(">");
                return WalkStatus::SkipChildren;
            }
        }
        NodeValue::SoftBreak => {
            if entering {
                ctx.push_str("\n");
            }
        }
        NodeValue::HardBreak => {
            if entering {
                ctx.push_str("<br>\n");
            }
        }
        NodeValue::InlineHtml(html) => {
            if entering {
                ctx.push_str(html);
            }
        }
        NodeValue::TaskListMarker(checked) => {
            if entering {
                ctx.push_str(if *checked {
                    r#"<input checked="" disabled="" type="checkbox"> "#
                } else {
                    r#"<input disabled="" type="checkbox"> "#
                });
            }
        }
        NodeValue::Callout(_) => {
            ctx.push_str(if entering { "<blockquote>\n" } else { "</blockquote>\n" });
        }
        NodeValue::CalloutTitle(title) => {
            if entering && let Some(default_title) = &title.default_title {
                ctx.push_str("<p>");
                ctx.push_escaped(default_title);
                ctx.push_str("</p>\n");
            }
        }
    }
    WalkStatus::Continue
}
