//! Pending asset queue for a single page pass.

use std::mem;

use url::Url;

/// Ordered queue of asset URLs pending download.
///
/// Owned by the asset pipeline for the duration of one page pass.
/// During the pass it is append-only: category processing seeds it and
/// stylesheet rewriting extends it with newly discovered references.
/// The drain phase takes a snapshot and clears the queue; the pipeline
/// re-drains until the queue stays empty, so entries appended while a
/// snapshot is being processed are still visited before the pass ends.
#[derive(Debug, Default)]
pub struct AssetQueue {
    pending: Vec<Url>,
}

impl AssetQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single URL.
    pub fn push(&mut self, url: Url) {
        self.pending.push(url);
    }

    /// Append all URLs, preserving order.
    pub fn extend(&mut self, urls: impl IntoIterator<Item = Url>) {
        self.pending.extend(urls);
    }

    /// Take a snapshot of the pending entries, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Url> {
        mem::take(&mut self.pending)
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if the queue has no pending entries.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
