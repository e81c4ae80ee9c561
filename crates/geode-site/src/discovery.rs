//! Content discovery by filesystem walking.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SiteError;
use crate::ignore::IgnoreRules;

/// Lowercased extensions copied to the output as assets.
pub const ASSET_EXTENSIONS: &[&str] = &[
    "pdf", "csv", "mp3", "wav", "ogg", "mp4", "mov", "webm", "png", "jpg", "jpeg", "gif", "svg",
    "webp",
];

/// A discovered markdown document or asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// Path on disk.
    pub path: PathBuf,
    /// Slash-separated path relative to the content root.
    pub relative_path: String,
    /// Size in bytes.
    pub size: u64,
    pub is_markdown: bool,
    pub is_asset: bool,
}

/// Walk `root` and return its markdown documents and assets sorted by
/// relative path.
///
/// Hidden entries and paths excluded by `rules` are skipped; an excluded
/// directory is not descended into.
///
/// # Errors
///
/// Returns [`SiteError::Discovery`] if `root` is missing or any directory
/// cannot be read.
pub fn discover(root: &Path, rules: &IgnoreRules) -> Result<Vec<FileEntry>, SiteError> {
    let mut entries = Vec::new();
    walk(root, root, rules, &mut entries)?;
    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(entries)
}

fn walk(
    root: &Path,
    dir: &Path,
    rules: &IgnoreRules,
    out: &mut Vec<FileEntry>,
) -> Result<(), SiteError> {
    for entry in fs::read_dir(dir).map_err(SiteError::discovery(dir))? {
        let entry = entry.map_err(SiteError::discovery(dir))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let relative = relative_path(root, &path);
        if rules.excludes(&relative) {
            continue;
        }

        let file_type = entry.file_type().map_err(SiteError::discovery(&path))?;
        if file_type.is_dir() {
            walk(root, &path, rules, out)?;
            continue;
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let is_markdown = extension == "md";
        let is_asset = ASSET_EXTENSIONS.contains(&extension.as_str());
        if !is_markdown && !is_asset {
            continue;
        }

        let size = entry.metadata().map_err(SiteError::discovery(&path))?.len();
        out.push(FileEntry {
            path,
            relative_path: relative,
            size,
            is_markdown,
            is_asset,
        });
    }
    Ok(())
}

/// `path` relative to `root`, joined with `/` on every platform.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn touch(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn relative_paths(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.relative_path.as_str()).collect()
    }

    #[test]
    fn test_discover_sorted_markdown_and_assets() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "zeta.md", "# Z");
        touch(dir.path(), "alpha/beta.md", "# B");
        touch(dir.path(), "alpha/img/Diagram.PNG", "png");
        touch(dir.path(), "notes.txt", "ignored");
        touch(dir.path(), "board.canvas", "{}");

        let entries = discover(dir.path(), &IgnoreRules::default()).unwrap();

        assert_eq!(
            relative_paths(&entries),
            vec!["alpha/beta.md", "alpha/img/Diagram.PNG", "zeta.md"]
        );
        assert!(entries[0].is_markdown && !entries[0].is_asset);
        assert!(entries[1].is_asset && !entries[1].is_markdown);
        assert_eq!(entries[1].size, 3);
        assert_eq!(entries[1].path, dir.path().join("alpha/img/Diagram.PNG"));
    }

    #[test]
    fn test_discover_skips_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".obsidian/workspace.md", "");
        touch(dir.path(), ".draft.md", "");
        touch(dir.path(), "visible.md", "");

        let entries = discover(dir.path(), &IgnoreRules::default()).unwrap();
        assert_eq!(relative_paths(&entries), vec!["visible.md"]);
    }

    #[test]
    fn test_discover_prunes_ignored_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "private/secret.md", "");
        touch(dir.path(), "private/deep/more.md", "");
        touch(dir.path(), "public/page.md", "");
        touch(dir.path(), "public/scratch.md", "");

        let rules = IgnoreRules::new(&["private".to_owned(), "scratch*".to_owned()]);
        let entries = discover(dir.path(), &rules).unwrap();
        assert_eq!(relative_paths(&entries), vec!["public/page.md"]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover(&dir.path().join("missing"), &IgnoreRules::default());
        assert!(matches!(result, Err(SiteError::Discovery { .. })));
    }
}
