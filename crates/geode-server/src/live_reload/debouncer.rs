//! Debounced rebuild scheduling.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use notify::Watcher;
use tokio::task::JoinHandle;

use super::SiteRebuild;
use super::registry::SubscriberRegistry;

/// State shared by the event consumer and the pending timer.
#[derive(Default)]
pub(crate) struct WatchState {
    /// Watcher registering the directories; `None` once stopped.
    pub watcher: Option<Box<dyn Watcher + Send>>,
    /// Directories currently registered with the watcher.
    pub watched: HashSet<PathBuf>,
    /// Incremented on every schedule; a timer only fires if still current.
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl WatchState {
    /// Abort the pending timer, if any.
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

pub(crate) type SharedWatchState = Arc<Mutex<WatchState>>;

/// Runs at most one rebuild per burst of events, after `delay` of quiet.
pub(crate) struct Debouncer {
    delay: Duration,
    state: SharedWatchState,
    site: Arc<dyn SiteRebuild>,
    registry: Arc<SubscriberRegistry>,
}

impl Debouncer {
    pub fn new(
        delay: Duration,
        state: SharedWatchState,
        site: Arc<dyn SiteRebuild>,
        registry: Arc<SubscriberRegistry>,
    ) -> Self {
        Self {
            delay,
            state,
            site,
            registry,
        }
    }

    /// Restart the quiet interval for a change to `changed`.
    ///
    /// `state` is the locked [`WatchState`] of this debouncer. Must be called
    /// from within a tokio runtime.
    pub fn schedule(&self, state: &mut WatchState, changed: PathBuf) {
        state.cancel_pending();
        state.generation += 1;
        let generation = state.generation;

        let delay = self.delay;
        let shared = Arc::clone(&self.state);
        let site = Arc::clone(&self.site);
        let registry = Arc::clone(&self.registry);

        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if state.generation != generation {
                    return;
                }
                // Fired: later events start a new timer instead of aborting this rebuild.
                state.pending = None;
            }
            run_rebuild(changed, site, &registry).await;
        }));
    }
}

async fn run_rebuild(changed: PathBuf, site: Arc<dyn SiteRebuild>, registry: &SubscriberRegistry) {
    tracing::info!(path = %changed.display(), "Changed");
    match tokio::task::spawn_blocking(move || site.rebuild_site()).await {
        Ok(Ok(report)) => {
            let delivered = registry.broadcast();
            tracing::info!(
                pages = report.pages,
                elapsed_ms = report.elapsed.as_millis(),
                clients = delivered,
                "Site rebuilt"
            );
        }
        Ok(Err(error)) => tracing::error!(%error, "Rebuild failed"),
        Err(error) => tracing::error!(%error, "Rebuild task panicked"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Instant;

    use geode_site::{BuildReport, SiteError};

    use super::*;

    const DELAY: Duration = Duration::from_millis(200);

    #[derive(Default)]
    struct CountingSite {
        runs: AtomicUsize,
        last_run: Mutex<Option<Instant>>,
        fail: AtomicBool,
    }

    impl SiteRebuild for CountingSite {
        fn rebuild_site(&self) -> Result<BuildReport, SiteError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            *self.last_run.lock().unwrap() = Some(Instant::now());
            if self.fail.load(Ordering::SeqCst) {
                return Err(SiteError::Discovery {
                    path: PathBuf::from("/content"),
                    source: std::io::Error::other("boom"),
                });
            }
            Ok(BuildReport::default())
        }
    }

    fn debouncer(site: &Arc<CountingSite>, registry: &Arc<SubscriberRegistry>) -> Debouncer {
        Debouncer::new(
            DELAY,
            SharedWatchState::default(),
            Arc::clone(site) as Arc<dyn SiteRebuild>,
            Arc::clone(registry),
        )
    }

    fn schedule(debouncer: &Debouncer, name: &str) {
        let mut state = debouncer.state.lock().unwrap();
        debouncer.schedule(&mut state, PathBuf::from(name));
    }

    #[tokio::test]
    async fn test_burst_triggers_single_rebuild_after_quiet_interval() {
        let site = Arc::new(CountingSite::default());
        let registry = Arc::new(SubscriberRegistry::new());
        let mut subscription = registry.subscribe();
        let debouncer = debouncer(&site, &registry);

        for i in 0..5 {
            schedule(&debouncer, &format!("note-{i}.md"));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let last_event = Instant::now();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(site.runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(site.runs.load(Ordering::SeqCst), 1);

        let ran_after = site.last_run.lock().unwrap().unwrap() - last_event;
        assert!(ran_after >= Duration::from_millis(150), "{ran_after:?}");
        assert!(ran_after < Duration::from_millis(400), "{ran_after:?}");
        assert_eq!(subscription.recv().await, Some(()));
    }

    #[tokio::test]
    async fn test_separate_bursts_rebuild_separately() {
        let site = Arc::new(CountingSite::default());
        let registry = Arc::new(SubscriberRegistry::new());
        let debouncer = debouncer(&site, &registry);

        schedule(&debouncer, "a.md");
        tokio::time::sleep(Duration::from_millis(350)).await;
        schedule(&debouncer, "b.md");
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(site.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_rebuild_does_not_broadcast() {
        let site = Arc::new(CountingSite::default());
        site.fail.store(true, Ordering::SeqCst);
        let registry = Arc::new(SubscriberRegistry::new());
        let mut subscription = registry.subscribe();
        let debouncer = debouncer(&site, &registry);

        schedule(&debouncer, "a.md");
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(site.runs.load(Ordering::SeqCst), 1);
        let received = tokio::time::timeout(Duration::from_millis(20), subscription.recv()).await;
        assert!(received.is_err());
    }

    #[tokio::test]
    async fn test_cancel_pending_prevents_rebuild() {
        let site = Arc::new(CountingSite::default());
        let registry = Arc::new(SubscriberRegistry::new());
        let debouncer = debouncer(&site, &registry);

        schedule(&debouncer, "a.md");
        debouncer.state.lock().unwrap().cancel_pending();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(site.runs.load(Ordering::SeqCst), 0);
    }
}
