//! Live reload: watch the sources, rebuild after a quiet interval, and
//! tell connected browsers to reload.

mod debouncer;
mod manager;
mod noise;
mod registry;
mod sse;

use geode_site::{BuildReport, SiteBuilder, SiteError};

pub(crate) use manager::LiveReloadManager;
pub use noise::{is_noise, qualifies};
pub use registry::{SubscriberRegistry, Subscription};
pub(crate) use sse::sse_handler;

/// The rebuild run after each debounced burst of changes.
pub trait SiteRebuild: Send + Sync + 'static {
    /// Rebuild the whole site for live serving.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError`] if the build fails; no reload is broadcast then.
    fn rebuild_site(&self) -> Result<BuildReport, SiteError>;
}

impl SiteRebuild for SiteBuilder {
    fn rebuild_site(&self) -> Result<BuildReport, SiteError> {
        self.rebuild(true)
    }
}
