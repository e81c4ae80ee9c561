//! Development server for geode.
//!
//! Builds the site once, serves the output directory over HTTP, and with
//! live reload enabled watches the content and theme directories: a burst
//! of changes triggers one rebuild after a quiet interval, and connected
//! browsers are told to reload over server-sent events.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use geode_config::Config;
//! use geode_server::{ServerConfig, run_server};
//! use geode_site::SiteBuilder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load(None, None).unwrap();
//!     let builder = Arc::new(SiteBuilder::from_config(&config));
//!     run_server(ServerConfig::from(&config), builder).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! notify ──► consumer task ──► noise filter ──► Debouncer (one timer)
//!                                                   │
//!                                                   └─► rebuild (blocking pool)
//!                                                          │
//! Browser ◄──SSE /_reload── SubscriberRegistry ◄──broadcast┘
//! Browser ◄──HTTP────────── static files (output directory)
//! ```

mod app;
mod error;
mod live_reload;
mod middleware;
mod state;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use geode_config::Config;
use geode_site::SiteBuilder;
use state::AppState;

pub use error::ServerError;
pub use live_reload::{SiteRebuild, SubscriberRegistry, Subscription, is_noise, qualifies};

/// Path of the server-sent events endpoint.
pub const RELOAD_PATH: &str = "/_reload";
/// Data payload of every live reload message.
pub const RELOAD_EVENT: &str = "reload";

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Content directory watched for changes.
    pub content_dir: PathBuf,
    /// Theme directory watched for changes.
    pub theme_dir: PathBuf,
    /// Directory static files are served from.
    pub output_dir: PathBuf,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// Quiet interval before a burst of changes triggers a rebuild.
    pub debounce: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3001,
            content_dir: PathBuf::from("content"),
            theme_dir: PathBuf::from("themes/default"),
            output_dir: PathBuf::from("public"),
            live_reload_enabled: true,
            debounce: Duration::from_millis(200),
        }
    }
}

impl From<&Config> for ServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            content_dir: config.site.content_dir.clone(),
            theme_dir: config.site.theme_dir.clone(),
            output_dir: config.site.output_dir.clone(),
            live_reload_enabled: config.live_reload.enabled,
            debounce: config.debounce(),
        }
    }
}

/// Run the server.
///
/// Builds the site, starts watching when live reload is enabled, and serves
/// until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the initial build fails, the watcher cannot be set
/// up, or the address cannot be bound.
pub async fn run_server(config: ServerConfig, builder: Arc<SiteBuilder>) -> Result<(), ServerError> {
    let live = config.live_reload_enabled;
    let initial = Arc::clone(&builder);
    let report = tokio::task::spawn_blocking(move || initial.rebuild(live)).await??;
    tracing::info!(pages = report.pages, assets = report.assets, "Initial build complete");

    let registry = live.then(|| Arc::new(SubscriberRegistry::new()));

    // Keeps the watcher alive until the server stops.
    let _live_reload = match &registry {
        Some(registry) => {
            let mut manager = live_reload::LiveReloadManager::new(
                vec![config.content_dir.clone(), config.theme_dir.clone()],
                config.debounce,
                builder,
                Arc::clone(registry),
            );
            manager.start()?;
            Some(manager)
        }
        None => None,
    };

    let state = Arc::new(AppState {
        output_dir: config.output_dir.clone(),
        registry,
    });
    let app = app::create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, live_reload = live, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Cannot listen for Ctrl-C, serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
