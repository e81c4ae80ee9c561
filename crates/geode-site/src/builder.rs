//! The rebuild pipeline.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use geode_config::{BuildMode, Config};
use geode_markdown::{
    CalloutExtension, CollectedLink, ExternalLinkExtension, LinkCollector, Markdown, PageIndex,
    WikilinkExtension,
};
use tracing::{debug, info, warn};

use crate::assets::{asset_destination, copy_assets, copy_theme_assets};
use crate::discovery::{FileEntry, discover};
use crate::error::SiteError;
use crate::filter::is_included;
use crate::ignore::IgnoreRules;
use crate::output::{HtmlWriter, OutputWriter, PageOutput};
use crate::page::SourceDocument;
use crate::stats::{count_words, reading_time};
use crate::tree::FileTree;

/// Inputs of a site build.
#[derive(Clone, Debug)]
pub struct SiteOptions {
    pub title: String,
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
    pub theme_dir: PathBuf,
    pub ignore_patterns: Vec<String>,
    pub mode: BuildMode,
}

impl From<&Config> for SiteOptions {
    fn from(config: &Config) -> Self {
        let site = &config.site;
        Self {
            title: site.title.clone(),
            content_dir: site.content_dir.clone(),
            output_dir: site.output_dir.clone(),
            theme_dir: site.theme_dir.clone(),
            ignore_patterns: site.ignore_patterns.clone(),
            mode: config.build.mode,
        }
    }
}

/// Outcome of a successful rebuild.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages written.
    pub pages: usize,
    /// Content assets copied.
    pub assets: usize,
    /// Documents left out by the filter or for malformed front matter.
    pub skipped: usize,
    /// Resolved cross-references collected while rendering.
    pub links: usize,
    pub elapsed: Duration,
}

/// Runs full site rebuilds, one at a time.
#[derive(Debug)]
pub struct SiteBuilder {
    options: SiteOptions,
    ignore: IgnoreRules,
    links: Arc<LinkCollector>,
    rebuild_lock: Mutex<()>,
}

/// A document ready for output.
struct RenderedPage<'a> {
    document: &'a SourceDocument,
    word_count: usize,
    html: String,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(options: SiteOptions) -> Self {
        Self {
            ignore: IgnoreRules::new(&options.ignore_patterns),
            options,
            links: Arc::new(LinkCollector::new()),
            rebuild_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(SiteOptions::from(config))
    }

    #[must_use]
    pub fn options(&self) -> &SiteOptions {
        &self.options
    }

    /// Links collected by the most recent build.
    #[must_use]
    pub fn links(&self) -> Vec<CollectedLink> {
        self.links.links()
    }

    /// Rebuild the site with the shipped [`HtmlWriter`]. `live` embeds the
    /// reload client in every page.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError`] if discovery, page output or asset copying fails.
    /// The output directory may then be partially written.
    pub fn rebuild(&self, live: bool) -> Result<BuildReport, SiteError> {
        let writer = HtmlWriter::new(&self.options.output_dir, &self.options.title, live)
            .with_theme(&self.options.theme_dir)?;
        self.rebuild_with(&writer)
    }

    /// Rebuild the site, handing every page to `writer`.
    ///
    /// # Errors
    ///
    /// See [`rebuild`](Self::rebuild).
    pub fn rebuild_with(&self, writer: &dyn OutputWriter) -> Result<BuildReport, SiteError> {
        let _guard = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let started = Instant::now();
        let options = &self.options;

        self.clean_output_dir()?;

        let entries = discover(&options.content_dir, &self.ignore)?;
        debug!(entries = entries.len(), "Discovered content");

        let (documents, assets, skipped) = self.load_documents(entries)?;

        let index = self.build_index(&documents, &assets);
        self.links.reset();
        let markdown = Markdown::builder()
            .with(CalloutExtension)
            .with(WikilinkExtension::new(index, Arc::clone(&self.links)))
            .with(ExternalLinkExtension)
            .build();

        let pages: Vec<RenderedPage<'_>> = documents
            .iter()
            .map(|document| RenderedPage {
                document,
                word_count: count_words(&document.body),
                html: markdown.convert(&document.body),
            })
            .collect();

        let tree = FileTree::from_pages(
            pages
                .iter()
                .map(|p| (p.document.permalink.as_str(), p.document.title.as_str())),
        );

        for page in &pages {
            let document = page.document;
            writer.write(
                &PageOutput {
                    relative_path: &document.entry.relative_path,
                    permalink: &document.permalink,
                    title: &document.title,
                    front_matter: &document.front_matter,
                    word_count: page.word_count,
                    reading_time: reading_time(page.word_count),
                    html: &page.html,
                },
                &tree,
            )?;
        }

        let asset_count = copy_assets(&assets, &self.ignore, &options.output_dir)?;
        let theme_assets = copy_theme_assets(&options.theme_dir, &options.output_dir)?;

        let report = BuildReport {
            pages: pages.len(),
            assets: asset_count,
            skipped,
            links: self.links.len(),
            elapsed: started.elapsed(),
        };
        info!(
            pages = report.pages,
            assets = report.assets,
            theme_assets,
            skipped = report.skipped,
            links = report.links,
            elapsed_ms = report.elapsed.as_millis(),
            "Site built"
        );
        Ok(report)
    }

    fn clean_output_dir(&self) -> Result<(), SiteError> {
        let output_dir = &self.options.output_dir;
        if self.options.content_dir.starts_with(output_dir) {
            return Err(SiteError::UnsafeOutputDir(output_dir.clone()));
        }
        match fs::remove_dir_all(output_dir) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                return Err(SiteError::Output {
                    path: output_dir.clone(),
                    source: e,
                });
            }
            _ => {}
        }
        fs::create_dir_all(output_dir).map_err(SiteError::output(output_dir))
    }

    /// Read and decode every markdown entry, then apply the build mode.
    ///
    /// Returns the documents to build, the assets, and the number of
    /// documents skipped.
    fn load_documents(
        &self,
        entries: Vec<FileEntry>,
    ) -> Result<(Vec<SourceDocument>, Vec<FileEntry>, usize), SiteError> {
        let mut documents = Vec::new();
        let mut assets = Vec::new();
        let mut skipped = 0;

        for entry in entries {
            if entry.is_asset {
                assets.push(entry);
                continue;
            }
            let source = fs::read_to_string(&entry.path).map_err(SiteError::discovery(&entry.path))?;
            let relative_path = entry.relative_path.clone();
            match SourceDocument::parse(entry, &source) {
                Ok(document) if is_included(self.options.mode, &document.front_matter) => {
                    documents.push(document);
                }
                Ok(_) => {
                    debug!(path = %relative_path, mode = ?self.options.mode, "Document filtered out");
                    skipped += 1;
                }
                Err(error) => {
                    warn!(path = %relative_path, %error, "Skipping document with malformed front matter");
                    skipped += 1;
                }
            }
        }
        Ok((documents, assets, skipped))
    }

    /// Resolver index over the documents being built and the assets that
    /// will be copied.
    fn build_index(&self, documents: &[SourceDocument], assets: &[FileEntry]) -> PageIndex {
        let mut index = PageIndex::new();
        for document in documents {
            index.insert(&document.entry.relative_path, document.url());
        }
        for asset in assets {
            if !self.ignore.excludes_asset(&asset.relative_path) {
                index.insert(
                    &asset.relative_path,
                    format!("/{}", asset_destination(&asset.relative_path)),
                );
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn write(&self, relative: &str, content: &str) {
            let path = self.dir.path().join("content").join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn options(&self, mode: BuildMode) -> SiteOptions {
            SiteOptions {
                title: "Test".to_owned(),
                content_dir: self.dir.path().join("content"),
                output_dir: self.dir.path().join("public"),
                theme_dir: self.dir.path().join("themes/default"),
                ignore_patterns: Vec::new(),
                mode,
            }
        }

        fn output(&self, relative: &str) -> String {
            fs::read_to_string(self.dir.path().join("public").join(relative)).unwrap()
        }

        fn output_exists(&self, relative: &str) -> bool {
            self.dir.path().join("public").join(relative).exists()
        }
    }

    #[test]
    fn test_rebuild_writes_pages_and_collects_links() {
        let fixture = Fixture::new();
        fixture.write("index.md", "---\ntitle: Home\n---\nSee [[guides/Setup#Install Steps]] and [[Other|the other]].");
        fixture.write("guides/Setup.md", "## Install Steps\n\nRun it.");
        fixture.write("deep/Other.md", "Other page");
        fixture.write("img/diagram.png", "png");

        let builder = SiteBuilder::new(fixture.options(BuildMode::Draft));
        let report = builder.rebuild(false).unwrap();

        assert_eq!(report.pages, 3);
        assert_eq!(report.assets, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.links, 2);

        let home = fixture.output("index.html");
        assert!(home.contains("<title>Home</title>"));
        assert!(home.contains(r#"<a href="/guides/Setup#install-steps" class="wikilink">"#));
        assert!(home.contains(r#"<a href="/deep/Other" class="wikilink">the other</a>"#));
        assert!(fixture.output("guides/Setup.html").contains(r#"<h2 id="install-steps">"#));
        assert!(fixture.output_exists("img/diagram.png"));

        let links = builder.links();
        assert_eq!(
            links,
            vec![
                CollectedLink {
                    title: "guides/Setup#Install Steps".to_owned(),
                    url: "/guides/Setup#install-steps".to_owned(),
                },
                CollectedLink {
                    title: "the other".to_owned(),
                    url: "/deep/Other".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_rebuild_resets_collector_and_cleans_output() {
        let fixture = Fixture::new();
        fixture.write("a.md", "[[b]]");
        fixture.write("b.md", "B");
        let builder = SiteBuilder::new(fixture.options(BuildMode::Draft));

        assert_eq!(builder.rebuild(false).unwrap().links, 1);
        fs::remove_file(fixture.dir.path().join("content/b.md")).unwrap();
        fixture.write("a.md", "no links any more");

        let report = builder.rebuild(false).unwrap();
        assert_eq!(report.links, 0);
        assert!(builder.links().is_empty());
        assert!(!fixture.output_exists("b.html"));
    }

    #[test]
    fn test_rebuild_skips_malformed_front_matter_only() {
        let fixture = Fixture::new();
        fixture.write("good.md", "fine");
        fixture.write("bad.md", "---\ntitle: [oops\n---\nbody");

        let report = SiteBuilder::new(fixture.options(BuildMode::Draft))
            .rebuild(false)
            .unwrap();

        assert_eq!(report.pages, 1);
        assert_eq!(report.skipped, 1);
        assert!(fixture.output_exists("good.html"));
        assert!(!fixture.output_exists("bad.html"));
    }

    #[test]
    fn test_build_modes() {
        let fixture = Fixture::new();
        fixture.write("plain.md", "plain");
        fixture.write("draft.md", "---\ndraft: true\n---\ndraft");
        fixture.write("published.md", "---\npublish: true\n---\nout");

        let draft = SiteBuilder::new(fixture.options(BuildMode::Draft))
            .rebuild(false)
            .unwrap();
        assert_eq!((draft.pages, draft.skipped), (2, 1));
        assert!(!fixture.output_exists("draft.html"));

        let explicit = SiteBuilder::new(fixture.options(BuildMode::Explicit))
            .rebuild(false)
            .unwrap();
        assert_eq!((explicit.pages, explicit.skipped), (1, 2));
        assert!(fixture.output_exists("published.html"));
        assert!(!fixture.output_exists("plain.html"));
    }

    #[test]
    fn test_filtered_pages_do_not_resolve() {
        let fixture = Fixture::new();
        fixture.write("a.md", "[[secret]]");
        fixture.write("secret.md", "---\ndraft: true\n---\nhidden");

        SiteBuilder::new(fixture.options(BuildMode::Draft))
            .rebuild(false)
            .unwrap();
        assert!(fixture.output("a.html").contains("wikilink is-unresolved"));
    }

    #[test]
    fn test_embedded_asset_renders_image() {
        let fixture = Fixture::new();
        fixture.write("a.md", "![[My Diagram.png]]");
        fixture.write("media/My Diagram.png", "png");

        SiteBuilder::new(fixture.options(BuildMode::Draft))
            .rebuild(false)
            .unwrap();
        assert!(fixture.output("a.html").contains(r#"<img src="/media/My-Diagram.png""#));
        assert!(fixture.output_exists("media/My-Diagram.png"));
    }

    #[test]
    fn test_live_rebuild_embeds_reload_client() {
        let fixture = Fixture::new();
        fixture.write("a.md", "a");
        let builder = SiteBuilder::new(fixture.options(BuildMode::Draft));

        builder.rebuild(true).unwrap();
        assert!(fixture.output("a.html").contains("EventSource"));
        builder.rebuild(false).unwrap();
        assert!(!fixture.output("a.html").contains("EventSource"));
    }

    #[test]
    fn test_theme_assets_copied_and_linked() {
        let fixture = Fixture::new();
        fixture.write("a.md", "a");
        let theme_assets = fixture.dir.path().join("themes/default/assets");
        fs::create_dir_all(&theme_assets).unwrap();
        fs::write(theme_assets.join("site.css"), "body{}").unwrap();

        SiteBuilder::new(fixture.options(BuildMode::Draft))
            .rebuild(false)
            .unwrap();
        assert!(fixture.output_exists("assets/site.css"));
        assert!(fixture.output("a.html").contains(r#"href="/assets/site.css""#));
    }

    #[test]
    fn test_missing_content_dir_fails() {
        let fixture = Fixture::new();
        let result = SiteBuilder::new(fixture.options(BuildMode::Draft)).rebuild(false);
        assert!(matches!(result, Err(SiteError::Discovery { .. })));
    }

    #[test]
    fn test_refuses_output_dir_containing_content() {
        let fixture = Fixture::new();
        fixture.write("a.md", "a");
        let mut options = fixture.options(BuildMode::Draft);
        options.output_dir = fixture.dir.path().to_path_buf();

        let result = SiteBuilder::new(options).rebuild(false);
        assert!(matches!(result, Err(SiteError::UnsafeOutputDir(_))));
        assert!(fixture.dir.path().join("content/a.md").exists());
    }

    struct RecordingWriter(Mutex<Vec<(String, usize)>>);

    impl OutputWriter for RecordingWriter {
        fn write(&self, page: &PageOutput<'_>, tree: &FileTree) -> Result<(), SiteError> {
            self.0
                .lock()
                .unwrap()
                .push((page.permalink.to_owned(), tree.page_count()));
            Ok(())
        }
    }

    #[test]
    fn test_rebuild_with_custom_writer() {
        let fixture = Fixture::new();
        fixture.write("b.md", "b");
        fixture.write("a/c.md", "c");
        let writer = RecordingWriter(Mutex::new(Vec::new()));

        SiteBuilder::new(fixture.options(BuildMode::Draft))
            .rebuild_with(&writer)
            .unwrap();

        assert_eq!(
            writer.0.into_inner().unwrap(),
            vec![("a/c".to_owned(), 2), ("b".to_owned(), 2)]
        );
        assert!(fixture.dir.path().join("public").is_dir());
    }
}
