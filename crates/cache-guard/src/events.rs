//! Event types emitted by the cache guard.

use cache_guard_core::LifecycleEvent;
use std::time::{Duration, Instant};

/// Events emitted while the shared cache is borrowed, returned, or evicted.
#[derive(Debug, Clone)]
pub enum CacheGuardEvent {
    /// The slot was empty, so a fresh cache was built.
    CacheCreated {
        guard_name: String,
        timestamp: Instant,
        /// Number of entries in the new cache.
        size: usize,
    },
    /// A worker took the existing cache out of the slot.
    CacheReused {
        guard_name: String,
        timestamp: Instant,
        /// Successful units of work the cache has already been through.
        generation: u64,
    },
    /// A worker loop is sleeping before its next unit of work.
    WorkerWaiting {
        guard_name: String,
        timestamp: Instant,
        delay: Duration,
    },
    /// The simulated unit of work is holding the cache for `delay`.
    WorkSimulated {
        guard_name: String,
        timestamp: Instant,
        delay: Duration,
    },
    /// A unit of work succeeded and the cache went back into the slot.
    CacheReturned {
        guard_name: String,
        timestamp: Instant,
        generation: u64,
    },
    /// A unit of work failed; the cache it held was discarded.
    WorkFailed {
        guard_name: String,
        timestamp: Instant,
        /// Display form of the failure.
        error: String,
    },
    /// The reaper found the cache idle for too long and dropped it.
    CacheEvicted {
        guard_name: String,
        timestamp: Instant,
        idle: Duration,
    },
    /// The reaper could not get the slot without waiting and skipped this tick.
    EvictionSkipped {
        guard_name: String,
        timestamp: Instant,
    },
}

impl LifecycleEvent for CacheGuardEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheGuardEvent::CacheCreated { .. } => "cache_created",
            CacheGuardEvent::CacheReused { .. } => "cache_reused",
            CacheGuardEvent::WorkerWaiting { .. } => "worker_waiting",
            CacheGuardEvent::WorkSimulated { .. } => "work_simulated",
            CacheGuardEvent::CacheReturned { .. } => "cache_returned",
            CacheGuardEvent::WorkFailed { .. } => "work_failed",
            CacheGuardEvent::CacheEvicted { .. } => "cache_evicted",
            CacheGuardEvent::EvictionSkipped { .. } => "eviction_skipped",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheGuardEvent::CacheCreated { timestamp, .. }
            | CacheGuardEvent::CacheReused { timestamp, .. }
            | CacheGuardEvent::WorkerWaiting { timestamp, .. }
            | CacheGuardEvent::WorkSimulated { timestamp, .. }
            | CacheGuardEvent::CacheReturned { timestamp, .. }
            | CacheGuardEvent::WorkFailed { timestamp, .. }
            | CacheGuardEvent::CacheEvicted { timestamp, .. }
            | CacheGuardEvent::EvictionSkipped { timestamp, .. } => *timestamp,
        }
    }

    fn guard_name(&self) -> &str {
        match self {
            CacheGuardEvent::CacheCreated { guard_name, .. }
            | CacheGuardEvent::CacheReused { guard_name, .. }
            | CacheGuardEvent::WorkerWaiting { guard_name, .. }
            | CacheGuardEvent::WorkSimulated { guard_name, .. }
            | CacheGuardEvent::CacheReturned { guard_name, .. }
            | CacheGuardEvent::WorkFailed { guard_name, .. }
            | CacheGuardEvent::CacheEvicted { guard_name, .. }
            | CacheGuardEvent::EvictionSkipped { guard_name, .. } => guard_name,
        }
    }
}
