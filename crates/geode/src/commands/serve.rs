//! `geode serve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use geode_config::{CliSettings, Config};
use geode_server::{ServerConfig, run_server};
use geode_site::SiteBuilder;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover geode.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (rebuild and request logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable live reload.
    #[arg(long)]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.dir,
            host: self.host,
            port: self.port,
            live_reload_enabled: self.no_live_reload.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.status(
            "Serving",
            &format!("http://{}:{}", config.server.host, config.server.port),
        );
        output.status("Content", &config.site.content_dir.display().to_string());
        output.status("Output", &config.site.output_dir.display().to_string());
        let live_reload = if config.live_reload.enabled {
            format!("on, {}ms debounce", config.live_reload.debounce_ms)
        } else {
            "off".to_owned()
        };
        output.status("Live reload", &live_reload);

        let builder = Arc::new(SiteBuilder::from_config(&config));
        run_server(ServerConfig::from(&config), builder).await?;

        Ok(())
    }
}
