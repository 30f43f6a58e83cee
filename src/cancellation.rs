//! Cooperative cancellation for deferred work.
//!
//! The tracker arms one deferred recomputation shortly after tracking starts,
//! because initial layout may not have settled yet. The host may have already
//! queued that wake-up when teardown begins, so the pending work carries a
//! token the teardown path can flip; a delivered pulse checks it before
//! acting on geometry that may no longer exist.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
