//! Single-slot, last-write-wins handoff between the frame producer and the
//! classification worker.
//!
//! There is no queue: a slow reader skips frames and a fast reader may see the
//! same frame twice, but the slot never holds more than one frame.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Holds the most recent frame
#[derive(Debug)]
pub struct LatestFrame<F> {
    slot: Mutex<Option<Arc<F>>>,
    published: AtomicU64,
}

impl<F> Default for LatestFrame<F> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
            published: AtomicU64::new(0),
        }
    }
}

impl<F> LatestFrame<F> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame
    pub fn publish(&self, frame: F) {
        *self.slot.lock() = Some(Arc::new(frame));
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    /// The current frame, if any has been published
    #[must_use]
    pub fn latest(&self) -> Option<Arc<F>> {
        self.slot.lock().clone()
    }

    /// Drop the current frame
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Number of frames published so far
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
