//! Configuration for geode.
//!
//! A site is configured by `geode.toml`. Every section is optional:
//!
//! ```toml
//! [site]
//! title = "Garden"
//! content_dir = "notes"        # default "content"
//! output_dir = "dist"          # default "public"
//! theme = "dark"               # themes/<theme> next to this file
//! ignore_patterns = ["*.canvas", "private/"]
//!
//! [build]
//! mode = "explicit"            # or "draft" (default)
//!
//! [server]
//! host = "${GEODE_HOST:-127.0.0.1}"
//! port = 3001
//!
//! [live_reload]
//! enabled = true
//! debounce_ms = 200
//! ```
//!
//! Relative paths are anchored to the directory holding the file. Without
//! an explicit path the file is searched for in the working directory and
//! its ancestors. [`CliSettings`] are applied last.

mod error;
mod expand;
mod sections;
mod validate;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use error::ConfigError;
pub use sections::{BuildConfig, BuildMode, LiveReloadConfig, ServerConfig, SiteConfig};

use sections::ConfigFile;

/// Name of the config file looked up by [`Config::load`].
pub const CONFIG_FILE_NAME: &str = "geode.toml";

/// Command-line overrides. `None` keeps the configured value.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub content_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub live_reload_enabled: Option<bool>,
}

impl CliSettings {
    fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.content_dir {
            config.site.content_dir.clone_from(dir);
        }
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(enabled) = self.live_reload_enabled {
            config.live_reload.enabled = enabled;
        }
    }
}

/// Resolved configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub site: SiteConfig,
    pub build: BuildConfig,
    pub server: ServerConfig,
    pub live_reload: LiveReloadConfig,
    /// File the values came from; `None` for built-in defaults.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load the config for the current invocation.
    ///
    /// `path` must exist when given. Otherwise the nearest `geode.toml` in
    /// the working directory or its ancestors is used, and failing that the
    /// defaults relative to the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, not valid
    /// TOML, references an unset variable, or holds out-of-range values.
    pub fn load(path: Option<&Path>, cli: Option<&CliSettings>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::from_file(path)?,
            None => {
                let cwd = std::env::current_dir()?;
                match find_config_file(&cwd) {
                    Some(found) => Self::from_file(&found)?,
                    None => Self::defaults_in(&cwd),
                }
            }
        };

        if let Some(cli) = cli {
            cli.apply_to(&mut config);
            validate::check(&config)?;
        }
        Ok(config)
    }

    /// Parse `geode.toml` text, anchoring relative paths to `base`.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn from_toml(text: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut file: ConfigFile = toml::from_str(text)?;
        file.server.host = expand::expand_env(&file.server.host, "server.host")?;

        let config = Self::from_parts(file, base);
        validate::check(&config)?;
        Ok(config)
    }

    /// Built-in defaults with paths under `base`.
    #[must_use]
    pub fn defaults_in(base: &Path) -> Self {
        Self::from_parts(ConfigFile::default(), base)
    }

    /// Debounce interval for live reload.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.live_reload.debounce_ms)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&text, base)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    fn from_parts(file: ConfigFile, base: &Path) -> Self {
        Self {
            site: file.site.resolve(base),
            build: file.build,
            server: file.server,
            live_reload: file.live_reload,
            source: None,
        }
    }
}

/// Nearest `geode.toml` in `start` or one of its ancestors.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FULL: &str = r#"
[site]
title = "Garden"
content_dir = "notes"
output_dir = "dist"
theme = "dark"
ignore_patterns = ["*.canvas", "private/"]

[build]
mode = "explicit"

[server]
host = "0.0.0.0"
port = 9000

[live_reload]
enabled = false
debounce_ms = 350
"#;

    #[test]
    fn test_defaults() {
        let config = Config::defaults_in(Path::new("/site"));
        assert_eq!(
            config.site,
            SiteConfig {
                title: "geode".to_owned(),
                content_dir: PathBuf::from("/site/content"),
                output_dir: PathBuf::from("/site/public"),
                theme: "default".to_owned(),
                theme_dir: PathBuf::from("/site/themes/default"),
                ignore_patterns: Vec::new(),
            }
        );
        assert_eq!(config.build.mode, BuildMode::Draft);
        assert_eq!((config.server.host.as_str(), config.server.port), ("127.0.0.1", 3001));
        assert!(config.live_reload.enabled);
        assert_eq!(config.debounce(), Duration::from_millis(200));
        assert_eq!(config.source, None);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = Config::from_toml("", Path::new("/site")).unwrap();
        assert_eq!(config.site, Config::defaults_in(Path::new("/site")).site);
        assert_eq!(config.live_reload.debounce_ms, 200);
    }

    #[test]
    fn test_every_section() {
        let config = Config::from_toml(FULL, Path::new("/project")).unwrap();
        assert_eq!(config.site.title, "Garden");
        assert_eq!(config.site.content_dir, PathBuf::from("/project/notes"));
        assert_eq!(config.site.output_dir, PathBuf::from("/project/dist"));
        assert_eq!(config.site.theme_dir, PathBuf::from("/project/themes/dark"));
        assert_eq!(config.site.ignore_patterns, vec!["*.canvas", "private/"]);
        assert_eq!(config.build.mode, BuildMode::Explicit);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(!config.live_reload.enabled);
        assert_eq!(config.debounce(), Duration::from_millis(350));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let config =
            Config::from_toml("[site]\noutput_dir = \"/var/www/garden\"\n", Path::new("/project")).unwrap();
        assert_eq!(config.site.output_dir, PathBuf::from("/var/www/garden"));
    }

    #[test]
    fn test_unknown_build_mode() {
        let err = Config::from_toml("[build]\nmode = \"sometimes\"\n", Path::new("/")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::defaults_in(Path::new("/site"));
        CliSettings {
            content_dir: Some(PathBuf::from("/vault")),
            host: Some("0.0.0.0".to_owned()),
            port: Some(8080),
            live_reload_enabled: Some(false),
        }
        .apply_to(&mut config);

        assert_eq!(config.site.content_dir, PathBuf::from("/vault"));
        assert_eq!(config.site.output_dir, PathBuf::from("/site/public"));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(!config.live_reload.enabled);
    }

    #[test]
    fn test_empty_cli_settings_change_nothing() {
        let mut config = Config::defaults_in(Path::new("/site"));
        CliSettings::default().apply_to(&mut config);
        assert_eq!(config.site.content_dir, PathBuf::from("/site/content"));
        assert_eq!(config.server.port, 3001);
    }

    #[test]
    fn test_host_expands_environment() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("GEODE_CONFIG_TEST_HOST", "10.0.0.7");
        }
        let config = Config::from_toml(
            "[server]\nhost = \"${GEODE_CONFIG_TEST_HOST}\"\n",
            Path::new("/"),
        )
        .unwrap();
        assert_eq!(config.server.host, "10.0.0.7");
        unsafe {
            std::env::remove_var("GEODE_CONFIG_TEST_HOST");
        }
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let text = "[server]\nport = 0\n[site]\ntheme = \"\"\nignore_patterns = [\"[oops\"]\n\
                    [live_reload]\ndebounce_ms = 0\n";
        let ConfigError::Validation(message) = Config::from_toml(text, Path::new("/")).unwrap_err()
        else {
            panic!("expected a validation error");
        };
        assert!(message.contains("server.port"));
        assert!(message.contains("site.theme"));
        assert!(message.contains("live_reload.debounce_ms"));
        assert!(message.contains("\"[oops\""));
    }

    #[test]
    fn test_debounce_bounds() {
        for (ms, ok) in [(1, true), (10_000, true), (10_001, false)] {
            let text = format!("[live_reload]\ndebounce_ms = {ms}\n");
            assert_eq!(Config::from_toml(&text, Path::new("/")).is_ok(), ok, "{ms}");
        }
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/geode.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_file_anchors_paths_and_applies_cli() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[site]\ncontent_dir = \"vault\"\n").unwrap();

        let cli = CliSettings {
            port: Some(4000),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&cli)).unwrap();

        assert_eq!(config.site.content_dir, dir.path().join("vault"));
        assert_eq!(config.site.output_dir, dir.path().join("public"));
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.source, Some(path));
    }

    #[test]
    fn test_cli_values_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "").unwrap();
        let cli = CliSettings {
            host: Some(String::new()),
            ..CliSettings::default()
        };
        assert!(matches!(
            Config::load(Some(&path), Some(&cli)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("notes/daily");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_config_file(&nested), None);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(find_config_file(&nested), Some(dir.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[server\nport = 1").unwrap();
        assert!(matches!(Config::load(Some(&path), None), Err(ConfigError::Parse(_))));
    }
}
