use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation signal for an in-flight facet execution.
///
/// Clones observe the same flag. Scans poll it periodically and abandon their
/// segment once it is raised.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
