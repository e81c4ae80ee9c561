//! Off-site links open in a new tab and carry a trailing icon.

use crate::ast::{Ast, NodeId, NodeKind, NodeValue};
use crate::document::Document;
use crate::extension::{AstTransformer, Extension, NodeRenderer, WalkStatus};
use crate::html::write_link_open;
use crate::markdown::MarkdownBuilder;
use crate::render::RenderContext;

/// Priority of the external-link renderer.
pub const EXTERNAL_LINK_RENDER_PRIORITY: u32 = 100;
/// Priority of the external-link transform; runs after heading ids.
pub const EXTERNAL_LINK_TRANSFORM_PRIORITY: u32 = 1000;

/// Inline icon appended inside external anchors.
pub const EXTERNAL_LINK_ICON: &str = r#"<svg class="external-link-icon" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="12" height="12" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" aria-hidden="true"><path d="M18 13v6a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2V8a2 2 0 0 1 2-2h6"></path><polyline points="15 3 21 3 21 9"></polyline><line x1="10" y1="14" x2="21" y2="3"></line></svg>"#;

const EXTERNAL_ATTRIBUTES: &str =
    r#" class="external-link" target="_blank" rel="noopener noreferrer""#;

/// Whether `destination` points off-site.
#[must_use]
pub fn is_external(destination: &str) -> bool {
    destination.starts_with("http://")
        || destination.starts_with("https://")
        || destination.starts_with("//")
}

/// Marks links with absolute `http(s)://` or protocol-relative destinations.
#[derive(Debug, Default)]
pub struct ExternalLinkTransformer;

impl AstTransformer for ExternalLinkTransformer {
    fn transform(&self, ast: &mut Ast, _doc: &Document) {
        for node in ast.descendants(ast.root()) {
            if let NodeValue::Link(link) = ast.value_mut(node) {
                link.external = is_external(&link.destination);
            }
        }
    }
}

/// Link renderer adding new-tab attributes and the icon to external links.
/// Other links render exactly like the built-in rule.
#[derive(Debug, Default)]
pub struct ExternalLinkRenderer;

impl NodeRenderer for ExternalLinkRenderer {
    fn kinds(&self) -> &[NodeKind] {
        &[NodeKind::Link]
    }

    fn render(&self, ctx: &mut RenderContext<'_>, node: NodeId, entering: bool) -> WalkStatus {
        let ast = ctx.ast;
        let NodeValue::Link(link) = ast.value(node) else {
            return WalkStatus::Continue;
        };
        if entering {
            let extra = if link.external { EXTERNAL_ATTRIBUTES } else { "" };
            write_link_open(ctx.out, link, extra);
        } else {
            if link.external {
                ctx.push_str(EXTERNAL_LINK_ICON);
            }
            ctx.push_str("</a>");
        }
        WalkStatus::Continue
    }
}

/// Registers [`ExternalLinkTransformer`] and [`ExternalLinkRenderer`].
#[derive(Debug, Default)]
pub struct ExternalLinkExtension;

impl Extension for ExternalLinkExtension {
    fn extend(self, builder: &mut MarkdownBuilder) {
        builder
            .transformer(ExternalLinkTransformer, EXTERNAL_LINK_TRANSFORM_PRIORITY)
            .renderer(ExternalLinkRenderer, EXTERNAL_LINK_RENDER_PRIORITY);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Markdown;

    fn convert(source: &str) -> String {
        Markdown::builder()
            .with(ExternalLinkExtension)
            .build()
            .convert(source)
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://example.com"));
        assert!(is_external("http://example.com/a"));
        assert!(is_external("//cdn.example.com/x.js"));
        assert!(!is_external("/docs/page"));
        assert!(!is_external("page.html"));
        assert!(!is_external("mailto:me@example.com"));
        assert!(!is_external(""));
    }

    #[test]
    fn test_external_link_html() {
        assert_eq!(
            convert("[Rust](https://www.rust-lang.org)\n"),
            format!(
                "<p><a href=\"https://www.rust-lang.org\" class=\"external-link\" \
                 target=\"_blank\" rel=\"noopener noreferrer\">Rust{EXTERNAL_LINK_ICON}</a></p>\n"
            )
        );
    }

    #[test]
    fn test_internal_link_matches_base_rendering() {
        let source = "[Docs](/docs \"Read\")\n";
        assert_eq!(convert(source), Markdown::default().convert(source));
    }

    #[test]
    fn test_transform_marks_only_external_links() {
        let parsed = Markdown::builder()
            .with(ExternalLinkExtension)
            .build()
            .parse("[a](https://a.example) [b](/b) <https://auto.example>\n");
        let flags: Vec<bool> = parsed
            .ast
            .descendants(parsed.ast.root())
            .into_iter()
            .filter_map(|node| match parsed.ast.value(node) {
                NodeValue::Link(link) => Some(link.external),
                _ => None,
            })
            .collect();
        assert_eq!(flags, vec![true, false, true]);
    }
}
