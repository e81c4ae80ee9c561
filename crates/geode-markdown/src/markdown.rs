//! Pipeline construction and the parse/render entry points.

use pulldown_cmark::Options;

use crate::ast::{Ast, NodeKind};
use crate::document::Document;
use crate::extension::{
    AstTransformer, BlockParser, Extension, InlineParser, NodeRenderer, Prioritized,
    sort_prioritized, trigger_table,
};
use crate::heading::HeadingIds;
use crate::{parse, render};

/// Priority of the built-in heading identifier pass.
const HEADING_IDS_PRIORITY: u32 = 100;

/// Output of [`Markdown::parse`].
#[derive(Debug)]
pub struct ParsedDocument {
    pub document: Document,
    pub ast: Ast,
}

/// Collects extension registrations before [`build`](Self::build) freezes
/// them into dispatch tables.
pub struct MarkdownBuilder {
    block_parsers: Vec<Prioritized<Box<dyn BlockParser>>>,
    inline_parsers: Vec<Prioritized<Box<dyn InlineParser>>>,
    transformers: Vec<Prioritized<Box<dyn AstTransformer>>>,
    renderers: Vec<Prioritized<Box<dyn NodeRenderer>>>,
    gfm: bool,
}

impl Default for MarkdownBuilder {
    fn default() -> Self {
        let mut builder = Self {
            block_parsers: Vec::new(),
            inline_parsers: Vec::new(),
            transformers: Vec::new(),
            renderers: Vec::new(),
            gfm: true,
        };
        builder.transformer(HeadingIds, HEADING_IDS_PRIORITY);
        builder
    }
}

impl MarkdownBuilder {
    pub fn block_parser(
        &mut self,
        parser: impl BlockParser + 'static,
        priority: u32,
    ) -> &mut Self {
        self.block_parsers.push(Prioritized {
            value: Box::new(parser),
            priority,
        });
        self
    }

    pub fn inline_parser(
        &mut self,
        parser: impl InlineParser + 'static,
        priority: u32,
    ) -> &mut Self {
        self.inline_parsers.push(Prioritized {
            value: Box::new(parser),
            priority,
        });
        self
    }

    pub fn transformer(
        &mut self,
        transformer: impl AstTransformer + 'static,
        priority: u32,
    ) -> &mut Self {
        self.transformers.push(Prioritized {
            value: Box::new(transformer),
            priority,
        });
        self
    }

    pub fn renderer(&mut self, renderer: impl NodeRenderer + 'static, priority: u32) -> &mut Self {
        self.renderers.push(Prioritized {
            value: Box::new(renderer),
            priority,
        });
        self
    }

    /// Register an extension bundle.
    #[must_use]
    pub fn with(mut self, extension: impl Extension) -> Self {
        extension.extend(&mut self);
        self
    }

    /// Enable or disable tables, strikethrough and task lists in the base engine.
    ///
    /// Enabled by default.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Freeze registrations into a pipeline.
    #[must_use]
    pub fn build(mut self) -> Markdown {
        sort_prioritized(&mut self.block_parsers);
        sort_prioritized(&mut self.inline_parsers);
        sort_prioritized(&mut self.transformers);
        sort_prioritized(&mut self.renderers);

        let block_dispatch = trigger_table(self.block_parsers.iter().map(|p| p.value.trigger()));
        let inline_dispatch =
            trigger_table(self.inline_parsers.iter().map(|p| p.value.trigger()));

        let mut render_dispatch = vec![None; NodeKind::COUNT];
        for (index, renderer) in self.renderers.iter().enumerate() {
            for kind in renderer.value.kinds() {
                render_dispatch[kind.slot()].get_or_insert(index);
            }
        }

        let options = if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        };

        Markdown {
            block_parsers: self.block_parsers.into_iter().map(|p| p.value).collect(),
            block_dispatch,
            inline_parsers: self.inline_parsers.into_iter().map(|p| p.value).collect(),
            inline_dispatch,
            transformers: self.transformers.into_iter().map(|p| p.value).collect(),
            renderers: self.renderers.into_iter().map(|p| p.value).collect(),
            render_dispatch,
            options,
        }
    }
}

/// A configured markdown pipeline.
///
/// Registrations are resolved once into fixed dispatch tables; parsing and
/// rendering never search the extension list.
///
/// # Example
///
/// ```
/// use geode_markdown::{CalloutExtension, ExternalLinkExtension, Markdown};
///
/// let md = Markdown::builder()
///     .with(CalloutExtension)
///     .with(ExternalLinkExtension)
///     .build();
/// let html = md.convert("> [!tip] Read this\n> body\n");
/// assert!(html.contains(r#"class="callout tip""#));
/// ```
pub struct Markdown {
    pub(crate) block_parsers: Vec<Box<dyn BlockParser>>,
    pub(crate) block_dispatch: Vec<Vec<usize>>,
    pub(crate) inline_parsers: Vec<Box<dyn InlineParser>>,
    pub(crate) inline_dispatch: Vec<Vec<usize>>,
    transformers: Vec<Box<dyn AstTransformer>>,
    pub(crate) renderers: Vec<Box<dyn NodeRenderer>>,
    pub(crate) render_dispatch: Vec<Option<usize>>,
    pub(crate) options: Options,
}

impl Default for Markdown {
    fn default() -> Self {
        MarkdownBuilder::default().build()
    }
}

impl Markdown {
    #[must_use]
    pub fn builder() -> MarkdownBuilder {
        MarkdownBuilder::default()
    }

    /// Parse `source` into a tree and run the registered transformers.
    #[must_use]
    pub fn parse(&self, source: &str) -> ParsedDocument {
        let mut document = Document::new(source);
        let mut ast = Ast::new();
        let root = ast.root();
        let source_region = document.source();

        parse::parse_blocks(self, &mut document, &mut ast, source_region, root);
        parse::expand_pending(self, &mut document, &mut ast);

        for transformer in &self.transformers {
            transformer.transform(&mut ast, &document);
        }

        ParsedDocument { document, ast }
    }

    /// Serialize a parsed document to HTML.
    #[must_use]
    pub fn render(&self, parsed: &ParsedDocument) -> String {
        render::render_html(self, &parsed.ast, &parsed.document)
    }

    /// Parse and render in one step.
    #[must_use]
    pub fn convert(&self, source: &str) -> String {
        self.render(&self.parse(source))
    }
}
