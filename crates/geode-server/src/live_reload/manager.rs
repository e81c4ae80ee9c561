//! Live reload manager.
//!
//! Watches the content and theme roots and feeds qualifying events to the
//! [`Debouncer`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::SiteRebuild;
use super::debouncer::{Debouncer, SharedWatchState};
use super::noise::{is_noise, qualifies};
use super::registry::SubscriberRegistry;

/// Capacity of the queue between the watcher callback and the consumer task.
const EVENT_QUEUE: usize = 256;

/// Owns the watcher and its consumer task for the lifetime of the server.
pub(crate) struct LiveReloadManager {
    roots: Vec<PathBuf>,
    debounce: Duration,
    site: Arc<dyn SiteRebuild>,
    registry: Arc<SubscriberRegistry>,
    state: SharedWatchState,
}

impl LiveReloadManager {
    pub(crate) fn new(
        roots: Vec<PathBuf>,
        debounce: Duration,
        site: Arc<dyn SiteRebuild>,
        registry: Arc<SubscriberRegistry>,
    ) -> Self {
        Self {
            roots,
            debounce,
            site,
            registry,
            state: SharedWatchState::default(),
        }
    }

    /// Register every directory under the roots and spawn the consumer task.
    ///
    /// Roots that do not exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or a directory
    /// cannot be registered.
    pub(crate) fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::channel::<notify::Result<Event>>(EVENT_QUEUE);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Use blocking_send since callback is sync
            let _ = tx.blocking_send(res);
        })?;

        let mut watched = HashSet::new();
        for root in &self.roots {
            if !root.is_dir() {
                tracing::warn!(path = %root.display(), "Watch root does not exist, skipping");
                continue;
            }
            watch_tree(&mut watcher, &mut watched, root)?;
        }
        tracing::info!(directories = watched.len(), "Watching for changes");

        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.watcher = Some(Box::new(watcher));
            state.watched = watched;
        }

        let state = Arc::clone(&self.state);
        let debouncer = Debouncer::new(
            self.debounce,
            Arc::clone(&self.state),
            Arc::clone(&self.site),
            Arc::clone(&self.registry),
        );
        tokio::spawn(async move {
            while let Some(result) = rx.recv().await {
                match result {
                    Ok(event) => handle_event(&event, &state, &debouncer),
                    Err(error) => tracing::warn!(%error, "Watcher error"),
                }
            }
        });

        Ok(())
    }

    /// Number of directories currently watched.
    #[cfg(test)]
    pub(crate) fn watched_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .watched
            .len()
    }
}

impl Drop for LiveReloadManager {
    fn drop(&mut self) {
        // Dropping the watcher closes the event queue, which ends the consumer task.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.watcher = None;
        state.cancel_pending();
    }
}

fn handle_event(event: &Event, state: &SharedWatchState, debouncer: &Debouncer) {
    if !qualifies(&event.kind) {
        return;
    }
    let paths: Vec<&PathBuf> = event.paths.iter().filter(|p| !is_noise(p)).collect();
    let Some(last) = paths.last() else {
        return;
    };
    tracing::debug!(kind = ?event.kind, paths = paths.len(), "Filesystem event");

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let state = &mut *state;
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => {
            if let Some(watcher) = state.watcher.as_deref_mut() {
                for path in paths.iter().filter(|p| p.is_dir()) {
                    if let Err(error) = watch_tree(watcher, &mut state.watched, path) {
                        tracing::warn!(path = %path.display(), %error, "Cannot watch new directory");
                    }
                }
            }
        }
        EventKind::Remove(_) => {
            for path in &paths {
                state.watched.retain(|dir| !dir.starts_with(path));
            }
        }
        _ => {}
    }
    debouncer.schedule(state, (*last).clone());
}

/// Register `root` and every non-hidden directory below it that is not
/// already watched. Returns the number of directories added.
pub(crate) fn watch_tree(
    watcher: &mut dyn Watcher,
    watched: &mut HashSet<PathBuf>,
    root: &Path,
) -> Result<usize, notify::Error> {
    let mut added = 0;
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        if !watched.contains(&dir) {
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            watched.insert(dir.clone());
            added += 1;
        }
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.filter_map(Result::ok) {
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if is_dir && !hidden {
                stack.push(entry.path());
            }
        }
    }
    Ok(added)
}
