//! Configuration for the cache guard.

use crate::cache::DEFAULT_CACHE_SIZE;
use crate::events::CacheGuardEvent;
use cache_guard_core::{EventListeners, FnListener};
use std::time::Duration;

/// Default upper bound for the worker loop's sleep between units of work.
pub const DEFAULT_MAXIMUM_TIME_WORKER: Duration = Duration::from_millis(200);
/// Default upper bound for the simulated work while the cache is borrowed.
pub const DEFAULT_MAXIMUM_IDLE_TIME: Duration = Duration::from_millis(100);
/// Default idle time after which the reaper drops the cache.
pub const DEFAULT_MAXIMUM_UNUSED_TIME: Duration = Duration::from_millis(30);
/// Default interval between reaper ticks.
pub const DEFAULT_CLEAR_CACHE_INTERVAL: Duration = Duration::from_millis(60);
/// Default odds of an injected failure (one in seventeen).
pub const DEFAULT_FAILURE_ODDS: u64 = 17;

/// Configuration shared by the borrow protocol, the worker loops, and the reaper.
#[derive(Clone, Debug)]
pub struct GuardConfig {
    /// Name of this guard instance for observability.
    pub(crate) name: String,
    /// Worker loops sleep up to this long before each unit of work.
    pub(crate) maximum_time_worker: Duration,
    /// Simulated work holds the cache up to this long.
    pub(crate) maximum_idle_time: Duration,
    /// A cache idle for strictly longer than this is evicted.
    pub(crate) maximum_unused_time: Duration,
    /// Fixed sleep between reaper ticks.
    pub(crate) clear_cache_interval: Duration,
    /// Entries in a freshly built cache.
    pub(crate) initial_cache_size: usize,
    /// One injected failure in `failure_odds` units of work. Zero disables injection.
    pub(crate) failure_odds: u64,
    /// Number of worker loops the orchestrator spawns.
    pub(crate) worker_count: usize,
    pub(crate) event_listeners: EventListeners<CacheGuardEvent>,
}

impl GuardConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GuardConfigBuilder {
        GuardConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn maximum_time_worker(&self) -> Duration {
        self.maximum_time_worker
    }

    pub fn maximum_idle_time(&self) -> Duration {
        self.maximum_idle_time
    }

    pub fn maximum_unused_time(&self) -> Duration {
        self.maximum_unused_time
    }

    pub fn clear_cache_interval(&self) -> Duration {
        self.clear_cache_interval
    }

    pub fn initial_cache_size(&self) -> usize {
        self.initial_cache_size
    }

    pub fn failure_odds(&self) -> u64 {
        self.failure_odds
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Longest time a single loop iteration can take.
    ///
    /// Bounds how long shutdown waits after the stop signal is raised.
    pub fn longest_iteration(&self) -> Duration {
        (self.maximum_time_worker + self.maximum_idle_time).max(self.clear_cache_interval)
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfigBuilder::new().build()
    }
}

/// Builder for [`GuardConfig`].
pub struct GuardConfigBuilder {
    name: String,
    maximum_time_worker: Duration,
    maximum_idle_time: Duration,
    maximum_unused_time: Duration,
    clear_cache_interval: Duration,
    initial_cache_size: usize,
    failure_odds: u64,
    worker_count: usize,
    event_listeners: EventListeners<CacheGuardEvent>,
}

impl GuardConfigBuilder {
    /// Creates a new builder with the reference defaults.
    pub fn new() -> Self {
        Self {
            name: "cache-guard".to_string(),
            maximum_time_worker: DEFAULT_MAXIMUM_TIME_WORKER,
            maximum_idle_time: DEFAULT_MAXIMUM_IDLE_TIME,
            maximum_unused_time: DEFAULT_MAXIMUM_UNUSED_TIME,
            clear_cache_interval: DEFAULT_CLEAR_CACHE_INTERVAL,
            initial_cache_size: DEFAULT_CACHE_SIZE,
            failure_odds: DEFAULT_FAILURE_ODDS,
            worker_count: 1,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the name of this guard instance.
    ///
    /// Default: "cache-guard"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Upper bound for the worker loop's randomized sleep.
    ///
    /// Default: 200ms
    pub fn maximum_time_worker(mut self, duration: Duration) -> Self {
        self.maximum_time_worker = duration;
        self
    }

    /// Upper bound for the simulated work performed while the cache is borrowed.
    ///
    /// Default: 100ms
    pub fn maximum_idle_time(mut self, duration: Duration) -> Self {
        self.maximum_idle_time = duration;
        self
    }

    /// Idle time after which the reaper drops the cache.
    ///
    /// A cache idle for exactly this long is kept; anything longer is evicted.
    /// Default: 30ms
    pub fn maximum_unused_time(mut self, duration: Duration) -> Self {
        self.maximum_unused_time = duration;
        self
    }

    /// Fixed interval between reaper ticks.
    ///
    /// Default: 60ms
    pub fn clear_cache_interval(mut self, duration: Duration) -> Self {
        self.clear_cache_interval = duration;
        self
    }

    /// Number of entries in a freshly built cache.
    ///
    /// Default: 1000
    pub fn initial_cache_size(mut self, size: usize) -> Self {
        self.initial_cache_size = size;
        self
    }

    /// One injected failure in `odds` units of work. Zero turns injection off.
    ///
    /// Default: 17
    pub fn failure_odds(mut self, odds: u64) -> Self {
        self.failure_odds = odds;
        self
    }

    /// Number of worker loops spawned by the orchestrator.
    ///
    /// Units of work stay serialized regardless: every worker borrows the same slot.
    /// Values below one are raised to one. Default: 1
    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    /// Registers a callback when a fresh cache is built.
    ///
    /// Called with the number of entries in the new cache.
    ///
    /// # Example
    /// ```
    /// use cache_guard::GuardConfig;
    ///
    /// let config = GuardConfig::builder()
    ///     .on_cache_created(|size| println!("built a cache of {} entries", size))
    ///     .build();
    /// ```
    pub fn on_cache_created<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheGuardEvent::CacheCreated { size, .. } = event {
                f(*size);
            }
        }));
        self
    }

    /// Registers a callback when a worker takes the existing cache from the slot.
    ///
    /// Called with the cache's generation.
    pub fn on_cache_reused<F>(mut self, f: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheGuardEvent::CacheReused { generation, .. } = event {
                f(*generation);
            }
        }));
        self
    }

    /// Registers a callback when a cache goes back into the slot after successful work.
    pub fn on_cache_returned<F>(mut self, f: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheGuardEvent::CacheReturned { generation, .. } = event {
                f(*generation);
            }
        }));
        self
    }

    /// Registers a callback when a unit of work fails.
    ///
    /// # Example
    /// ```
    /// use cache_guard::GuardConfig;
    ///
    /// let config = GuardConfig::builder()
    ///     .on_work_failed(|error| eprintln!("caught: {}", error))
    ///     .build();
    /// ```
    pub fn on_work_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheGuardEvent::WorkFailed { error, .. } = event {
                f(error);
            }
        }));
        self
    }

    /// Registers a callback when the reaper evicts the cache.
    ///
    /// Called with how long the cache had been idle.
    pub fn on_cache_evicted<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheGuardEvent::CacheEvicted { idle, .. } = event {
                f(*idle);
            }
        }));
        self
    }

    /// Registers a callback when the reaper skips a tick because the slot is busy.
    pub fn on_eviction_skipped<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add_for_type("eviction_skipped", move |_: &CacheGuardEvent| f());
        self
    }

    /// Registers a callback for every event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&CacheGuardEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> GuardConfig {
        GuardConfig {
            name: self.name,
            maximum_time_worker: self.maximum_time_worker,
            maximum_idle_time: self.maximum_idle_time,
            maximum_unused_time: self.maximum_unused_time,
            clear_cache_interval: self.clear_cache_interval,
            initial_cache_size: self.initial_cache_size,
            failure_odds: self.failure_odds,
            worker_count: self.worker_count,
            event_listeners: self.event_listeners,
        }
    }
}

impl Default for GuardConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
