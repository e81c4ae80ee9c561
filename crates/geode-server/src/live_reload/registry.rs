//! Registry of connected live-reload clients.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Set of connected subscribers, each with its own notification queue.
///
/// Every operation takes the internal lock, so connection tasks and the
/// rebuild task can use one registry concurrently.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    subscribers: HashMap<u64, mpsc::Sender<()>>,
}

/// Handle of one subscriber. Dropping it leaves the registry.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    receiver: mpsc::Receiver<()>,
    registry: Arc<SubscriberRegistry>,
}

impl SubscriberRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new subscriber.
    #[must_use]
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        // One slot: a reload already queued makes a second one redundant.
        let (sender, receiver) = mpsc::channel(1);
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.insert(id, sender);
        tracing::debug!(id, subscribers = inner.subscribers.len(), "Live reload client connected");
        Subscription {
            id,
            receiver,
            registry: Arc::clone(self),
        }
    }

    fn unsubscribe(&self, id: u64) {
        let mut inner = self.lock();
        if inner.subscribers.remove(&id).is_some() {
            tracing::debug!(id, subscribers = inner.subscribers.len(), "Live reload client disconnected");
        }
    }

    /// Queue a reload for every subscriber.
    ///
    /// Returns how many subscribers have a reload pending afterwards.
    /// Subscribers whose receiving side is gone are dropped.
    pub fn broadcast(&self) -> usize {
        let mut inner = self.lock();
        let mut delivered = 0;
        inner.subscribers.retain(|_, sender| match sender.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Closed(())) => false,
        });
        delivered
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Subscription {
    /// Wait for the next reload. `None` once the registry dropped this
    /// subscriber.
    pub async fn recv(&mut self) -> Option<()> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.id);
    }
}
