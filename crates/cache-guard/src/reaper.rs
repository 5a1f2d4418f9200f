//! Idle eviction.
//!
//! The reaper never waits for the slot. If a worker holds it, the cache is in
//! use and by definition not idle, so the tick is simply skipped.

use crate::cache::Cache;
use crate::config::GuardConfig;
use crate::events::CacheGuardEvent;
use crate::slot::CacheSlot;
use crate::stop::StopSignal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::counter;

/// What a single reaper tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// The slot was locked by a worker; nothing was inspected.
    Busy,
    /// The slot held no cache.
    Empty,
    /// The cache had been idle this long, which is within the limit.
    Fresh(Duration),
    /// The cache had been idle this long and was dropped.
    Evicted(Duration),
}

/// What a reaper did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaperReport {
    pub ticks: u64,
    /// Ticks skipped because a worker held the slot.
    pub busy: u64,
    pub evictions: u64,
}

/// Periodically drops the cache once it has sat unused for too long.
pub struct EvictionReaper {
    slot: Arc<CacheSlot<Cache>>,
    stop: StopSignal,
    config: Arc<GuardConfig>,
}

impl EvictionReaper {
    pub fn new(slot: Arc<CacheSlot<Cache>>, stop: StopSignal, config: Arc<GuardConfig>) -> Self {
        Self { slot, stop, config }
    }

    /// Sleeps `clear_cache_interval`, ticks, and repeats until stopped.
    pub async fn run(self) -> ReaperReport {
        let mut report = ReaperReport::default();

        while !self.stop.is_stopped() {
            tokio::time::sleep(self.config.clear_cache_interval).await;

            report.ticks += 1;
            match self.tick() {
                ReapOutcome::Busy => report.busy += 1,
                ReapOutcome::Evicted(_) => report.evictions += 1,
                ReapOutcome::Empty | ReapOutcome::Fresh(_) => {}
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            guard = %self.config.name,
            ticks = report.ticks,
            busy = report.busy,
            evictions = report.evictions,
            "reaper stopped"
        );

        report
    }

    /// Inspects the slot once, right now.
    pub fn tick(&self) -> ReapOutcome {
        self.tick_at(Instant::now())
    }

    /// Inspects the slot once, measuring idle time against `now`.
    ///
    /// Never waits: a busy slot yields [`ReapOutcome::Busy`] immediately.
    pub fn tick_at(&self, now: Instant) -> ReapOutcome {
        let Some(mut slot) = self.slot.try_lock() else {
            #[cfg(feature = "metrics")]
            counter!("cache_guard_reaper_busy_total", "guard" => self.config.name.clone())
                .increment(1);

            self.config
                .event_listeners
                .emit(&CacheGuardEvent::EvictionSkipped {
                    guard_name: self.config.name.clone(),
                    timestamp: std::time::Instant::now(),
                });
            return ReapOutcome::Busy;
        };

        let Some(idle) = slot.peek_idle_duration(now) else {
            return ReapOutcome::Empty;
        };

        if idle <= self.config.maximum_unused_time {
            return ReapOutcome::Fresh(idle);
        }

        slot.clear();
        drop(slot);

        #[cfg(feature = "metrics")]
        counter!("cache_guard_evictions_total", "guard" => self.config.name.clone()).increment(1);

        self.config
            .event_listeners
            .emit(&CacheGuardEvent::CacheEvicted {
                guard_name: self.config.name.clone(),
                timestamp: std::time::Instant::now(),
                idle,
            });

        #[cfg(feature = "tracing")]
        tracing::info!(
            guard = %self.config.name,
            idle_ms = idle.as_millis() as u64,
            "resetting the cache, elapsed time exceeded the unused limit"
        );

        ReapOutcome::Evicted(idle)
    }
}
