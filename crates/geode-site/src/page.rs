use crate::discovery::FileEntry;
use crate::error::MetadataError;
use crate::front_matter::{FrontMatter, parse_front_matter};
use crate::slug::path_to_slug;

/// A markdown document with its front matter decoded.
#[derive(Clone, Debug)]
pub struct SourceDocument {
    pub entry: FileEntry,
    pub front_matter: FrontMatter,
    /// Markdown after the front matter block.
    pub body: String,
    pub title: String,
    /// Output path without extension or leading `/`.
    pub permalink: String,
}

impl SourceDocument {
    /// Decode `source`, the contents of `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] if the front matter is malformed.
    pub fn parse(entry: FileEntry, source: &str) -> Result<Self, MetadataError> {
        let (front_matter, body) = parse_front_matter(source)?;
        let title = page_title(&front_matter, &entry.relative_path);
        let permalink = page_permalink(&front_matter, &entry.relative_path);
        Ok(Self {
            body: body.to_owned(),
            entry,
            front_matter,
            title,
            permalink,
        })
    }

    /// Site-absolute URL of the page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/{}", self.permalink)
    }
}

/// Front matter `title`, else the file stem.
fn page_title(front_matter: &FrontMatter, relative_path: &str) -> String {
    if let Some(title) = &front_matter.title {
        return title.clone();
    }
    let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    file_name
        .strip_suffix(".md")
        .unwrap_or(file_name)
        .to_owned()
}

/// Slugged front matter `permalink`, else the slugged relative path
/// without `.md`.
fn page_permalink(front_matter: &FrontMatter, relative_path: &str) -> String {
    match &front_matter.permalink {
        Some(permalink) => path_to_slug(permalink.trim_matches('/')),
        None => path_to_slug(relative_path.strip_suffix(".md").unwrap_or(relative_path)),
    }
}
