use std::sync::{Mutex, PoisonError};

/// A resolved reference seen while rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectedLink {
    pub title: String,
    pub url: String,
}

/// Thread-safe record of resolved references, shared between the renderer
/// and whoever builds the site. Reset it between builds.
#[derive(Debug, Default)]
pub struct LinkCollector {
    links: Mutex<Vec<CollectedLink>>,
}

impl LinkCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&self, link: CollectedLink) {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(link);
    }

    /// Copy of the links collected so far, in render order.
    #[must_use]
    pub fn links(&self) -> Vec<CollectedLink> {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reset(&self) {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
