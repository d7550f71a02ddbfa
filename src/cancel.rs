//! Cooperative cancellation for in-flight fetches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cloneable cancellation signal.
///
/// Every clone observes the same flag. Cancelling is idempotent and wakes
/// every task currently parked in [`CancelSignal::cancelled`].
#[derive(Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Returns `true` only for the call that flipped the flag.
    pub fn cancel(&self) -> bool {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
            return true;
        }
        false
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once the signal has been cancelled.
    pub async fn cancelled(&self) {
        // Register with Notify before checking the flag, otherwise a cancel()
        // landing between the check and the await would be lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl std::fmt::Debug for CancelSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
