//! Extensible markdown to HTML pipeline.
//!
//! A [`Markdown`] pipeline parses CommonMark (plus tables, strikethrough and
//! task lists) into an arena tree and renders it to HTML. Extensions hook
//! into four points: line-based block parsers, inline parsers, whole-tree
//! transformers and per-kind node renderers.
//!
//! Bundled extensions:
//!
//! - [`CalloutExtension`]: `> [!type]` admonition blocks
//! - [`WikilinkExtension`]: `[[page#section|label]]` cross-references
//! - [`ExternalLinkExtension`]: new-tab attributes and an icon for off-site links
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use geode_markdown::{
//!     CalloutExtension, ExternalLinkExtension, LinkCollector, Markdown, PageIndex,
//!     WikilinkExtension,
//! };
//!
//! let mut pages = PageIndex::new();
//! pages.insert("guides/Setup.md", "/guides/setup");
//! let links = Arc::new(LinkCollector::new());
//!
//! let md = Markdown::builder()
//!     .with(CalloutExtension)
//!     .with(WikilinkExtension::new(pages, Arc::clone(&links)))
//!     .with(ExternalLinkExtension)
//!     .build();
//!
//! let html = md.convert("> [!tip]\n> Start with [[Setup#Install]].\n");
//! assert!(html.contains(r#"<a href="/guides/setup#install" class="wikilink">"#));
//! assert_eq!(links.len(), 1);
//! ```

mod ast;
pub mod callout;
mod document;
mod extension;
pub mod external_link;
mod heading;
mod html;
mod markdown;
mod parse;
mod render;
pub mod wikilink;

pub use ast::{
    Alignment, Ast, Callout, CalloutTitle, Children, Link, NodeEdge, NodeId, NodeKind, NodeValue,
    Reference, ReferenceLink, TextValue, Traverse,
};
pub use callout::{CalloutExtension, CalloutParser, CalloutRenderer};
pub use document::{Document, Line, Segment};
pub use extension::{
    AstTransformer, BlockParser, BlockStart, Continuation, Extension, InlineMatch, InlineParser,
    NodeRenderer, WalkStatus,
};
pub use external_link::{ExternalLinkExtension, ExternalLinkRenderer, ExternalLinkTransformer};
pub use heading::{HeadingIds, heading_id};
pub use html::{escape_html, escape_url, write_link_open};
pub use markdown::{Markdown, MarkdownBuilder, ParsedDocument};
pub use render::RenderContext;
pub use wikilink::{
    CollectedLink, LinkCollector, PageIndex, ResolveReferences, Resolver, WikilinkExtension,
    WikilinkParser, WikilinkRenderer,
};
