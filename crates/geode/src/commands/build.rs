//! `geode build` command implementation.

use std::path::PathBuf;

use clap::Args;
use geode_config::{CliSettings, Config};
use geode_site::{BuildReport, SiteBuilder};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover geode.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Enable verbose output (per-document warnings and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the build fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.status(
            "Building",
            &format!(
                "{} -> {}",
                config.site.content_dir.display(),
                config.site.output_dir.display()
            ),
        );

        let builder = SiteBuilder::from_config(&config);
        let report = builder.rebuild(false)?;

        output.status("Finished", &summary(&report));
        if report.skipped > 0 {
            output.warning(&format!(
                "{} document(s) skipped (filtered out or malformed front matter)",
                report.skipped
            ));
        }

        Ok(())
    }
}

/// One-line description of a finished build.
fn summary(report: &BuildReport) -> String {
    format!(
        "{} page(s), {} asset(s), {} link(s) in {}ms",
        report.pages,
        report.assets,
        report.links,
        report.elapsed.as_millis()
    )
}
