//! Tree-walking HTML renderer.
//!
//! Every node is rendered by the registered [`NodeRenderer`] for its kind,
//! or by the built-in HTML rules when none is registered.
//!
//! [`NodeRenderer`]: crate::NodeRenderer

use crate::ast::{Ast, NodeEdge, NodeId, TextValue};
use crate::document::Document;
use crate::extension::WalkStatus;
use crate::html;
use crate::markdown::Markdown;

/// State handed to renderers: the tree, its buffer and the output.
pub struct RenderContext<'a> {
    pub ast: &'a Ast,
    pub doc: &'a Document,
    pub out: &'a mut String,
}

impl<'a> RenderContext<'a> {
    /// Resolve a text payload.
    #[must_use]
    pub fn text(&self, value: &'a TextValue) -> &'a str {
        self.doc.text(value)
    }

    /// Plain text of the subtree rooted at `node`.
    #[must_use]
    pub fn plain_text(&self, node: NodeId) -> String {
        self.ast.plain_text(self.doc, node)
    }

    pub fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Append `s` with HTML special characters escaped.
    pub fn push_escaped(&mut self, s: &str) {
        html::escape_html_into(s, self.out);
    }
}

pub(crate) fn render_html(md: &Markdown, ast: &Ast, doc: &Document) -> String {
    let mut out = String::with_capacity(doc.source_text().len() * 3 / 2);
    let mut ctx = RenderContext {
        ast,
        doc,
        out: &mut out,
    };

    let mut traverse = ast.traverse(ast.root());
    while let Some(edge) = traverse.next() {
        let (node, entering) = match edge {
            NodeEdge::Enter(node) => (node, true),
            NodeEdge::Exit(node) => (node, false),
        };
        let status = match md.render_dispatch[ast.kind(node).slot()] {
            Some(index) => md.renderers[index].render(&mut ctx, node, entering),
            None => html::render_node(&mut ctx, node, entering),
        };
        if entering && status == WalkStatus::SkipChildren {
            traverse.skip_children(node);
        }
    }

    out
}
