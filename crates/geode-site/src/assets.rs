//! Copying content and theme assets into the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::discovery::FileEntry;
use crate::error::SiteError;
use crate::ignore::IgnoreRules;
use crate::slug::path_to_slug;

/// Output path of an asset, relative to the output directory: the slugged
/// relative path with the original extension kept as written.
#[must_use]
pub fn asset_destination(relative_path: &str) -> String {
    let file_start = relative_path.rfind('/').map_or(0, |i| i + 1);
    match relative_path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, extension) = relative_path.split_at(file_start + dot);
            format!("{}{extension}", path_to_slug(stem))
        }
        _ => path_to_slug(relative_path),
    }
}

/// Copy every asset in `entries` not excluded by `rules`.
///
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns [`SiteError::Output`] if a destination cannot be written.
pub fn copy_assets(
    entries: &[FileEntry],
    rules: &IgnoreRules,
    output_dir: &Path,
) -> Result<usize, SiteError> {
    let mut copied = 0;
    for entry in entries.iter().filter(|e| e.is_asset) {
        if rules.excludes_asset(&entry.relative_path) {
            debug!(path = %entry.relative_path, "Asset ignored");
            continue;
        }
        let destination = output_dir.join(asset_destination(&entry.relative_path));
        copy_file(&entry.path, &destination)?;
        copied += 1;
    }
    Ok(copied)
}

/// Copy `<theme_dir>/assets` to `<output_dir>/assets` verbatim.
///
/// A theme without an `assets` directory copies nothing.
///
/// # Errors
///
/// Returns [`SiteError::Discovery`] if the theme cannot be read and
/// [`SiteError::Output`] if a destination cannot be written.
pub fn copy_theme_assets(theme_dir: &Path, output_dir: &Path) -> Result<usize, SiteError> {
    let source = theme_dir.join("assets");
    let files = theme_asset_files(theme_dir)?;
    let destination = output_dir.join("assets");
    for relative in &files {
        copy_file(&source.join(relative), &destination.join(relative))?;
    }
    Ok(files.len())
}

/// Files under `<theme_dir>/assets`, relative to it and sorted.
pub(crate) fn theme_asset_files(theme_dir: &Path) -> Result<Vec<PathBuf>, SiteError> {
    let root = theme_dir.join("assets");
    let mut files = Vec::new();
    if root.is_dir() {
        collect_files(&root, &root, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SiteError> {
    for entry in fs::read_dir(dir).map_err(SiteError::discovery(dir))? {
        let path = entry.map_err(SiteError::discovery(dir))?.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(relative.to_path_buf());
        }
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<(), SiteError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(SiteError::output(parent))?;
    }
    fs::copy(from, to).map_err(SiteError::output(to))?;
    Ok(())
}
