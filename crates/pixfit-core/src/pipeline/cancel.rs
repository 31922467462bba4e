//! Cooperative cancellation for batch runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Clones observe the same flag.
///
/// The batch processor polls it before starting each image; an image
/// already in flight always runs to completion (or its timeout).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the current batch stop before its next image.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag; done at the start of every batch.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}
