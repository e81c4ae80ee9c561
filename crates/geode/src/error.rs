//! CLI error types.

use geode_config::ConfigError;
use geode_server::ServerError;
use geode_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
