//! Sections of `geode.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_TITLE: &str = "geode";
const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_OUTPUT_DIR: &str = "public";
const DEFAULT_THEME: &str = "default";

/// The file as written; every section and key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ConfigFile {
    pub(crate) site: SiteSection,
    pub(crate) build: BuildConfig,
    pub(crate) server: ServerConfig,
    pub(crate) live_reload: LiveReloadConfig,
}

/// `[site]` before its paths are anchored to the config directory.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SiteSection {
    title: Option<String>,
    content_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    theme: Option<String>,
    ignore_patterns: Vec<String>,
}

impl SiteSection {
    /// Fill in defaults and join relative paths onto `base`.
    pub(crate) fn resolve(self, base: &Path) -> SiteConfig {
        let theme = self.theme.unwrap_or_else(|| DEFAULT_THEME.to_owned());
        SiteConfig {
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
            content_dir: base.join(self.content_dir.as_deref().unwrap_or(Path::new(DEFAULT_CONTENT_DIR))),
            output_dir: base.join(self.output_dir.as_deref().unwrap_or(Path::new(DEFAULT_OUTPUT_DIR))),
            theme_dir: base.join("themes").join(&theme),
            theme,
            ignore_patterns: self.ignore_patterns,
        }
    }
}

/// `[site]` with absolute paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteConfig {
    pub title: String,
    /// Markdown documents and assets.
    pub content_dir: PathBuf,
    /// Wiped and rewritten on every build.
    pub output_dir: PathBuf,
    pub theme: String,
    /// `<config dir>/themes/<theme>`.
    pub theme_dir: PathBuf,
    /// Glob on the base name, or substring of the relative path.
    pub ignore_patterns: Vec<String>,
}

/// Which documents a build includes.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Everything except documents marked `draft: true`.
    #[default]
    Draft,
    /// Only documents marked `publish: true`.
    Explicit,
}

/// `[build]`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub mode: BuildMode,
}

/// `[server]`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address; `${VAR}` references are expanded.
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3001,
        }
    }
}

/// `[live_reload]`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    pub enabled: bool,
    /// Quiet interval after the last change before rebuilding.
    pub debounce_ms: u64,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 200,
        }
    }
}
