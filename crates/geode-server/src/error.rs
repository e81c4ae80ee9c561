use geode_site::SiteError;

/// Error returned by [`run_server`](crate::run_server).
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The initial build failed.
    #[error("Initial build failed: {0}")]
    Build(#[from] SiteError),
    /// The file watcher could not be set up.
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
    /// The listening socket could not be bound.
    #[error("Cannot listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    /// Serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A background task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
