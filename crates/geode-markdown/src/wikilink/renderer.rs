use std::fmt::Write;
use std::sync::Arc;

use tracing::debug;

use super::collector::{CollectedLink, LinkCollector};
use super::resolver::Resolver;
use crate::ast::{Ast, NodeId, NodeKind, NodeValue, Reference, ReferenceLink};
use crate::document::Document;
use crate::extension::{AstTransformer, NodeRenderer, WalkStatus};
use crate::html::{escape_html, escape_url};
use crate::render::RenderContext;

/// Extensions rendered as `<img>` when embedded.
const IMAGE_EXTENSIONS: &[&str] = &[
    "apng", "avif", "gif", "jpg", "jpeg", "jfif", "pjpeg", "pjp", "png", "svg", "webp",
];

fn is_image(target: &str) -> bool {
    let name = target.rsplit('/').next().unwrap_or(target);
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|image| ext.eq_ignore_ascii_case(image))
    })
}

/// Looks every reference up once, before rendering.
///
/// References inside the text of a standard link become
/// [`ReferenceLink::Nested`] so no anchor is nested in another. Image
/// embeds are exempt since they render as `<img>`.
pub struct ResolveReferences {
    resolver: Box<dyn Resolver>,
}

impl ResolveReferences {
    pub fn new(resolver: Box<dyn Resolver>) -> Self {
        Self { resolver }
    }
}

fn inside_link(ast: &Ast, node: NodeId) -> bool {
    let mut current = ast.parent(node);
    while let Some(parent) = current {
        if ast.kind(parent) == NodeKind::Link {
            return true;
        }
        current = ast.parent(parent);
    }
    false
}

impl AstTransformer for ResolveReferences {
    fn transform(&self, ast: &mut Ast, _doc: &Document) {
        for node in ast.descendants(ast.root()) {
            let NodeValue::Reference(reference) = ast.value(node) else {
                continue;
            };
            let link = if !reference.embed && inside_link(ast, node) {
                ReferenceLink::Nested
            } else if let Some(url) = self.resolver.resolve(reference) {
                ReferenceLink::Resolved(url)
            } else {
                debug!(reference = %reference.target, "Unresolved wikilink");
                ReferenceLink::Unresolved
            };
            if let NodeValue::Reference(reference) = ast.value_mut(node) {
                reference.link = link;
            }
        }
    }
}

/// Renders references as `wikilink` anchors, or `<img>` for image embeds.
///
/// Unresolved references render as an anchor without `href`, classed
/// `is-unresolved`. Each resolved anchor is recorded in the collector.
pub struct WikilinkRenderer {
    collector: Arc<LinkCollector>,
}

impl WikilinkRenderer {
    pub fn new(collector: Arc<LinkCollector>) -> Self {
        Self { collector }
    }

    /// The display text, or the raw target when the label renders empty.
    fn title(ctx: &RenderContext<'_>, node: NodeId, reference: &Reference) -> String {
        let label = ctx.plain_text(node);
        if !label.is_empty() {
            label
        } else if reference.fragment.is_empty() {
            reference.target.clone()
        } else {
            format!("{}#{}", reference.target, reference.fragment)
        }
    }
}

impl NodeRenderer for WikilinkRenderer {
    fn kinds(&self) -> &[NodeKind] {
        &[NodeKind::Reference]
    }

    fn render(&self, ctx: &mut RenderContext<'_>, node: NodeId, entering: bool) -> WalkStatus {
        let ast = ctx.ast;
        let NodeValue::Reference(reference) = ast.value(node) else {
            return WalkStatus::Continue;
        };
        let image = reference.embed && is_image(&reference.target);

        if !entering {
            match &reference.link {
                ReferenceLink::Nested => {}
                ReferenceLink::Resolved(_) if image => {}
                _ => ctx.push_str("</a>"),
            }
            return WalkStatus::Continue;
        }

        let url = match &reference.link {
            ReferenceLink::Nested => return WalkStatus::Continue,
            ReferenceLink::Resolved(url) => url,
            ReferenceLink::Pending | ReferenceLink::Unresolved => {
                ctx.push_str(r#"<a class="wikilink is-unresolved">"#);
                return WalkStatus::Continue;
            }
        };

        let title = Self::title(ctx, node, reference);
        if image {
            write!(
                ctx.out,
                r#"<img src="{}" alt="{}">"#,
                escape_url(url),
                escape_html(&title)
            )
            .unwrap();
            return WalkStatus::SkipChildren;
        }

        write!(ctx.out, r#"<a href="{}" class="wikilink">"#, escape_url(url)).unwrap();
        self.collector.collect(CollectedLink {
            title,
            url: url.clone(),
        });
        WalkStatus::Continue
    }
}
