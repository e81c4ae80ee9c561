use std::collections::HashMap;

use crate::ast::Reference;
use crate::heading::heading_id;

/// Maps a reference to the URL it points at.
pub trait Resolver: Send + Sync {
    /// `None` renders the reference as unresolved.
    fn resolve(&self, reference: &Reference) -> Option<String>;
}

/// Normalize a page path or reference target: forward slashes, no `.md`
/// suffix, no leading or trailing `/`.
fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim_matches('/');
    path.strip_suffix(".md").unwrap_or(path).trim_matches('/').to_owned()
}

fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Lookup table from page paths to URLs.
///
/// A target matches a page key exactly first. Otherwise its last path
/// segment is matched against the base names of all pages; when several
/// pages share a base name, the one with the shortest key wins, and among
/// equally short keys the first inserted.
#[derive(Clone, Debug, Default)]
pub struct PageIndex {
    pages: HashMap<String, String>,
    by_base: HashMap<String, String>,
}

impl PageIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page by its content-relative path (`notes/Alpha.md`).
    pub fn insert(&mut self, path: &str, url: impl Into<String>) {
        let key = normalize(path);
        let base = base_name(&key).to_owned();
        match self.by_base.get(&base) {
            Some(existing) if existing.len() <= key.len() => {}
            _ => {
                self.by_base.insert(base, key.clone());
            }
        }
        self.pages.insert(key, url.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// URL of the page `target` names, without any fragment.
    #[must_use]
    pub fn lookup(&self, target: &str) -> Option<&str> {
        let key = normalize(target);
        if let Some(url) = self.pages.get(&key) {
            return Some(url);
        }
        let shortest = self.by_base.get(base_name(&key))?;
        self.pages.get(shortest).map(String::as_str)
    }
}

impl<K: AsRef<str>, U: Into<String>> FromIterator<(K, U)> for PageIndex {
    fn from_iter<I: IntoIterator<Item = (K, U)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (path, url) in iter {
            index.insert(path.as_ref(), url);
        }
        index
    }
}

impl Resolver for PageIndex {
    fn resolve(&self, reference: &Reference) -> Option<String> {
        let fragment = heading_id(&reference.fragment);
        if reference.target.is_empty() {
            return (!fragment.is_empty()).then(|| format!("#{fragment}"));
        }
        let url = self.lookup(&reference.target)?;
        if fragment.is_empty() {
            Some(url.to_owned())
        } else {
            Some(format!("{url}#{fragment}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn reference(target: &str, fragment: &str) -> Reference {
        Reference {
            target: target.to_owned(),
            fragment: fragment.to_owned(),
            ..Reference::default()
        }
    }

    fn index() -> PageIndex {
        [
            ("guides/setup/Install.md", "/guides/setup/install"),
            ("Install.md", "/install"),
            ("a/Index.md", "/a"),
            ("b/Index.md", "/b"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("notes\\Alpha.md"), "notes/Alpha");
        assert_eq!(normalize("/notes/Alpha/"), "notes/Alpha");
        assert_eq!(normalize("Alpha.markdown"), "Alpha.markdown");
    }

    #[test]
    fn test_exact_match_beats_base_name() {
        let index = index();
        assert_eq!(
            index.lookup("guides/setup/Install"),
            Some("/guides/setup/install")
        );
        assert_eq!(index.lookup("Install"), Some("/install"));
        assert_eq!(index.lookup("other/Install.md"), Some("/install"));
    }

    #[test]
    fn test_equal_length_keys_keep_first() {
        assert_eq!(index().lookup("Index"), Some("/a"));
    }

    #[test]
    fn test_shorter_key_replaces_longer() {
        let mut index = PageIndex::new();
        index.insert("deep/path/Note.md", "/deep");
        index.insert("x/Note.md", "/x");
        assert_eq!(index.lookup("Note"), Some("/x"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_resolve_with_fragment() {
        let index = index();
        assert_eq!(
            index.resolve(&reference("Install", " ## Step Two ")),
            Some("/install#step-two".to_owned())
        );
        assert_eq!(
            index.resolve(&reference("", "Top")),
            Some("#top".to_owned())
        );
        assert_eq!(index.resolve(&reference("", "")), None);
        assert_eq!(index.resolve(&reference("Nope", "Top")), None);
    }
}
