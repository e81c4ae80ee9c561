//! Page output: the [`OutputWriter`] seam and the shipped HTML writer.

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use geode_markdown::escape_html;

use crate::assets::theme_asset_files;
use crate::error::SiteError;
use crate::front_matter::FrontMatter;
use crate::tree::{FileTree, TreeNode};

/// Everything an output writer receives for one rendered page.
#[derive(Clone, Copy, Debug)]
pub struct PageOutput<'a> {
    pub relative_path: &'a str,
    pub permalink: &'a str,
    pub title: &'a str,
    pub front_matter: &'a FrontMatter,
    pub word_count: usize,
    pub reading_time: usize,
    /// Rendered markdown body.
    pub html: &'a str,
}

/// Final templating and persistence of rendered pages.
pub trait OutputWriter {
    /// Write one page.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Output`] if the page cannot be written.
    fn write(&self, page: &PageOutput<'_>, tree: &FileTree) -> Result<(), SiteError>;
}

const CALLOUT_SCRIPT_NAME: &str = "callout.js";

const CALLOUT_TOGGLE_SCRIPT: &str = r#"<script>
document.addEventListener("DOMContentLoaded", () => {
  document.querySelectorAll(".callout.is-collapsible").forEach((callout) => {
    const title = callout.querySelector(".callout-title");
    if (title) title.addEventListener("click", () => callout.classList.toggle("is-collapsed"));
  });
});
</script>
"#;

const LIVE_RELOAD_SCRIPT: &str = r#"<script>
new EventSource("/_reload").addEventListener("message", (event) => {
  if (event.data === "reload") location.reload();
});
</script>
"#;

/// Writes each page to `<output_dir>/<permalink>.html` inside a full HTML
/// document with the theme's stylesheets and scripts and a file explorer.
#[derive(Debug)]
pub struct HtmlWriter {
    output_dir: PathBuf,
    site_title: String,
    live: bool,
    stylesheets: Vec<String>,
    scripts: Vec<String>,
}

impl HtmlWriter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, site_title: impl Into<String>, live: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            site_title: site_title.into(),
            live,
            stylesheets: Vec::new(),
            scripts: Vec::new(),
        }
    }

    /// Link the `.css` and `.js` files found under `<theme_dir>/assets`,
    /// which the build copies to `/assets`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Discovery`] if the theme cannot be read.
    pub fn with_theme(mut self, theme_dir: &Path) -> Result<Self, SiteError> {
        for file in theme_asset_files(theme_dir)? {
            let url = format!(
                "/assets/{}",
                file.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            );
            match file.extension().and_then(|e| e.to_str()) {
                Some("css") => self.stylesheets.push(url),
                Some("js") => self.scripts.push(url),
                _ => {}
            }
        }
        Ok(self)
    }

    /// File a page with `permalink` is written to.
    #[must_use]
    pub fn page_path(&self, permalink: &str) -> PathBuf {
        if permalink.is_empty() {
            self.output_dir.join("index.html")
        } else if permalink.ends_with('/') {
            self.output_dir.join(permalink).join("index.html")
        } else {
            self.output_dir.join(format!("{permalink}.html"))
        }
    }

    fn has_callout_script(&self) -> bool {
        self.scripts
            .iter()
            .any(|url| url.rsplit('/').next() == Some(CALLOUT_SCRIPT_NAME))
    }

    /// Full HTML document for `page`.
    #[must_use]
    pub fn render_page(&self, page: &PageOutput<'_>, tree: &FileTree) -> String {
        let mut html = String::with_capacity(page.html.len() + 4096);
        let title = escape_html(page.title);

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        writeln!(html, "<title>{title}</title>").unwrap();
        for href in &self.stylesheets {
            writeln!(html, r#"<link rel="stylesheet" href="{}">"#, escape_html(href)).unwrap();
        }
        html.push_str("</head>\n<body>\n<div class=\"layout\">\n");

        html.push_str("<aside class=\"sidebar\">\n");
        writeln!(
            html,
            r#"<a class="site-title" href="/">{}</a>"#,
            escape_html(&self.site_title)
        )
        .unwrap();
        let current_url = format!("/{}", page.permalink);
        html.push_str("<nav class=\"file-explorer\">\n<ul>\n");
        render_tree(&mut html, &tree.nodes, &current_url);
        html.push_str("</ul>\n</nav>\n</aside>\n");

        html.push_str("<main class=\"content\">\n");
        let mut classes = String::from("page");
        for class in &page.front_matter.css_classes {
            classes.push(' ');
            classes.push_str(class);
        }
        writeln!(
            html,
            r#"<article class="{}" data-word-count="{}" data-reading-time="{}">"#,
            escape_html(&classes),
            page.word_count,
            page.reading_time
        )
        .unwrap();
        writeln!(
            html,
            "<header class=\"page-header\">\n<h1 class=\"page-title\">{title}</h1>\n\
             <p class=\"page-meta\">{} words, {} min read</p>\n</header>",
            page.word_count, page.reading_time
        )
        .unwrap();
        html.push_str(page.html);
        html.push_str("</article>\n</main>\n</div>\n");

        for src in &self.scripts {
            writeln!(html, r#"<script src="{}" defer></script>"#, escape_html(src)).unwrap();
        }
        if !self.has_callout_script() {
            html.push_str(CALLOUT_TOGGLE_SCRIPT);
        }
        if self.live {
            html.push_str(LIVE_RELOAD_SCRIPT);
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

impl OutputWriter for HtmlWriter {
    fn write(&self, page: &PageOutput<'_>, tree: &FileTree) -> Result<(), SiteError> {
        let path = self.page_path(page.permalink);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SiteError::output(parent))?;
        }
        fs::write(&path, self.render_page(page, tree)).map_err(SiteError::output(&path))
    }
}

/// Whether the folder `key` is an ancestor of `url`.
fn contains_page(key: &str, url: &str) -> bool {
    url.strip_prefix('/')
        .and_then(|path| path.strip_prefix(key))
        .is_some_and(|rest| rest.starts_with('/'))
}

fn render_tree(html: &mut String, nodes: &[TreeNode], current_url: &str) {
    for node in nodes {
        match node {
            TreeNode::Folder {
                name,
                key,
                children,
            } => {
                let open = if contains_page(key, current_url) { " open" } else { "" };
                writeln!(
                    html,
                    r#"<li class="tree-folder{open}" data-node-key="{}"><span class="folder">{}</span>"#,
                    escape_html(key),
                    escape_html(name)
                )
                .unwrap();
                html.push_str("<ul>\n");
                render_tree(html, children, current_url);
                html.push_str("</ul>\n</li>\n");
            }
            TreeNode::Page { title, url, .. } => {
                let current = if url == current_url {
                    r#" class="active" aria-current="page""#
                } else {
                    ""
                };
                writeln!(
                    html,
                    r#"<li class="tree-page"><a href="{}"{current}>{}</a></li>"#,
                    escape_html(url),
                    escape_html(title)
                )
                .unwrap();
            }
        }
    }
}
