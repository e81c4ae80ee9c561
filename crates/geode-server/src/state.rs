//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use crate::live_reload::SubscriberRegistry;

/// Application state shared across all request handlers.
pub(crate) struct AppState {
    /// Directory static files are served from.
    pub(crate) output_dir: PathBuf,
    /// Live reload subscribers (if enabled).
    pub(crate) registry: Option<Arc<SubscriberRegistry>>,
}
