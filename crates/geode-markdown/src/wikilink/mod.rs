//! Cross-references between pages (`[[target#fragment|label]]`).
//!
//! `![[...]]` marks an embed; embedding an image renders an `<img>`, other
//! embeds render as ordinary references. Resolved references are recorded in
//! a shared [`LinkCollector`].

mod collector;
mod parser;
mod renderer;
mod resolver;

use std::sync::Arc;

pub use collector::{CollectedLink, LinkCollector};
pub use parser::WikilinkParser;
pub use renderer::{ResolveReferences, WikilinkRenderer};
pub use resolver::{PageIndex, Resolver};

use crate::extension::Extension;
use crate::markdown::MarkdownBuilder;

/// Priority of the reference parser and renderer.
pub const WIKILINK_PRIORITY: u32 = 199;

/// Registers [`WikilinkParser`], a [`ResolveReferences`] pass bound to the
/// resolver, and a [`WikilinkRenderer`] feeding the collector.
pub struct WikilinkExtension {
    resolver: Box<dyn Resolver>,
    collector: Arc<LinkCollector>,
}

impl WikilinkExtension {
    pub fn new(resolver: impl Resolver + 'static, collector: Arc<LinkCollector>) -> Self {
        Self {
            resolver: Box::new(resolver),
            collector,
        }
    }
}

impl Extension for WikilinkExtension {
    fn extend(self, builder: &mut MarkdownBuilder) {
        builder
            .inline_parser(WikilinkParser, WIKILINK_PRIORITY)
            .transformer(ResolveReferences::new(self.resolver), WIKILINK_PRIORITY)
            .renderer(WikilinkRenderer::new(self.collector), WIKILINK_PRIORITY);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{CalloutExtension, Markdown};

    fn index() -> PageIndex {
        let mut index = PageIndex::new();
        index.insert("notes/Alpha.md", "/notes/alpha");
        index.insert("Beta.md", "/beta");
        index.insert("deep/nested/Beta.md", "/deep/nested/beta");
        index
    }

    fn convert(source: &str) -> (String, Arc<LinkCollector>) {
        let collector = Arc::new(LinkCollector::new());
        let md = Markdown::builder()
            .with(CalloutExtension)
            .with(WikilinkExtension::new(index(), Arc::clone(&collector)))
            .build();
        (md.convert(source), collector)
    }

    #[test]
    fn test_resolved_reference() {
        let (html, collector) = convert("See [[Alpha]].\n");
        assert_eq!(
            html,
            "<p>See <a href=\"/notes/alpha\" class=\"wikilink\">Alpha</a>.</p>\n"
        );
        assert_eq!(
            collector.links(),
            vec![CollectedLink {
                title: "Alpha".to_owned(),
                url: "/notes/alpha".to_owned(),
            }]
        );
    }

    #[test]
    fn test_label_and_fragment() {
        let (html, collector) = convert("[[notes/Alpha#Section One!|the *first* one]]\n");
        assert_eq!(
            html,
            "<p><a href=\"/notes/alpha#section-one\" class=\"wikilink\">the <em>first</em> one</a></p>\n"
        );
        assert_eq!(collector.links()[0].title, "the first one");
    }

    #[test]
    fn test_shortest_path_wins_for_base_name() {
        let (html, _) = convert("[[Beta]] [[nested/Beta]]\n");
        assert!(html.contains("<a href=\"/beta\" class=\"wikilink\">Beta</a>"));
        assert!(html.contains("<a href=\"/beta\" class=\"wikilink\">nested/Beta</a>"));
    }

    #[test]
    fn test_unresolved_reference() {
        let (html, collector) = convert("[[Missing|gone]]\n");
        assert_eq!(html, "<p><a class=\"wikilink is-unresolved\">gone</a></p>\n");
        assert_eq!(collector.len(), 0);
    }

    #[test]
    fn test_image_embed() {
        let collector = Arc::new(LinkCollector::new());
        let mut index = PageIndex::new();
        index.insert("img/diagram.png", "/img/diagram.png");
        let md = Markdown::builder()
            .with(WikilinkExtension::new(index, Arc::clone(&collector)))
            .build();
        assert_eq!(
            md.convert("![[diagram.png|A diagram]]\n"),
            "<p><img src=\"/img/diagram.png\" alt=\"A diagram\"></p>\n"
        );
        assert_eq!(collector.len(), 0);
    }

    #[test]
    fn test_escaped_and_code_references_stay_literal() {
        let (html, collector) = convert("\\[[Alpha]] and `[[Alpha]]`\n");
        assert_eq!(html, "<p>[[Alpha]] and <code>[[Alpha]]</code></p>\n");
        assert_eq!(collector.len(), 0);
    }

    #[test]
    fn test_reference_in_fenced_code_is_literal() {
        let (html, _) = convert("```\n[[Alpha]]\n```\n");
        assert_eq!(html, "<pre><code>[[Alpha]]\n</code></pre>\n");
    }

    #[test]
    fn test_reference_in_callout_title_and_body() {
        let (html, collector) = convert("> [!note] About [[Alpha]]\n> Also [[Beta|b]]\n");
        assert!(html.contains(
            "<div class=\"callout-title-inner\"><p>About <a href=\"/notes/alpha\" class=\"wikilink\">Alpha</a></p>"
        ));
        assert!(html.contains("<p>Also <a href=\"/beta\" class=\"wikilink\">b</a></p>"));
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn test_reference_inside_emphasis_and_link_text() {
        let (html, _) = convert("*see [[Alpha]]*\n");
        assert_eq!(
            html,
            "<p><em>see <a href=\"/notes/alpha\" class=\"wikilink\">Alpha</a></em></p>\n"
        );
    }

    #[test]
    fn test_fragment_only_reference_targets_same_page() {
        let (html, _) = convert("[[#Local Heading]]\n");
        assert_eq!(
            html,
            "<p><a href=\"#local-heading\" class=\"wikilink\">#Local Heading</a></p>\n"
        );
    }

    #[test]
    fn test_code_spans_take_precedence_over_brackets() {
        let (html, collector) = convert("Type `[[` to open and `]]` to close.\n");
        assert_eq!(
            html,
            "<p>Type <code>[[</code> to open and <code>]]</code> to close.</p>\n"
        );

        let (html, _) = convert("`code [[a` then a]] text\n");
        assert_eq!(html, "<p><code>code [[a</code> then a]] text</p>\n");
        assert_eq!(collector.len(), 0);
    }

    #[test]
    fn test_code_span_across_lines_hides_reference() {
        let (html, collector) = convert("`one\n[[Alpha]]` and [[Beta]]\n");
        assert!(html.contains("[[Alpha]]</code>"));
        assert!(html.contains("<a href=\"/beta\" class=\"wikilink\">Beta</a>"));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_autolink_keeps_brackets_in_url() {
        let (html, collector) = convert("<https://e.com/[[Alpha]]>\n");
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(!html.contains("wikilink"));
        assert!(html.contains(">https://e.com/[[Alpha]]</a>"));
        assert_eq!(collector.len(), 0);
    }

    #[test]
    fn test_reference_inside_link_text_renders_label_only() {
        let (html, collector) = convert("[text [[Alpha]]](/u)\n");
        assert_eq!(html, "<p><a href=\"/u\">text Alpha</a></p>\n");
        assert_eq!(collector.len(), 0);
    }

    #[test]
    fn test_collected_title_is_display_text() {
        let (_, collector) = convert("[[Alpha#Section One]] and [[Beta|*b*]]\n");
        let titles: Vec<String> = collector.links().into_iter().map(|l| l.title).collect();
        assert_eq!(titles, vec!["Alpha#Section One".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn test_each_reference_resolved_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use crate::Reference;

        struct Counting(Arc<AtomicUsize>);

        impl Resolver for Counting {
            fn resolve(&self, reference: &Reference) -> Option<String> {
                self.0.fetch_add(1, Ordering::SeqCst);
                (reference.target == "Alpha").then(|| "/alpha".to_owned())
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let collector = Arc::new(LinkCollector::new());
        let md = Markdown::builder()
            .with(WikilinkExtension::new(
                Counting(Arc::clone(&calls)),
                Arc::clone(&collector),
            ))
            .build();
        let html = md.convert("[[Alpha]] and [[Missing]]\n");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            html,
            "<p><a href=\"/alpha\" class=\"wikilink\">Alpha</a> and <a class=\"wikilink is-unresolved\">Missing</a></p>\n"
        );
        assert_eq!(collector.len(), 1);
    }
}
