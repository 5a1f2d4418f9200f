//! Cooperative stop signal shared by the worker loops and the reaper.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A write-once stop flag.
///
/// Starts unset, is set by [`stop`](Self::stop), and is never reset. Loops poll
/// it once per iteration, so work already in flight always finishes.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests every loop holding a clone of this signal to stop.
    ///
    /// Returns true only for the call that actually set the flag.
    pub fn stop(&self) -> bool {
        !self.stopped.swap(true, Ordering::AcqRel)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}
