//! Borrow, use, and return the shared cache.
//!
//! The whole unit of work runs under the slot's lock:
//!
//! 1. lock the slot (held until the end),
//! 2. take the cache out, or build a fresh one when the slot is empty,
//! 3. hand the cache by value to the unit of work,
//! 4. on success, put the returned cache back with a fresh timestamp,
//! 5. on failure, write nothing back.
//!
//! Step 5 needs no rollback code. The unit of work owned the cache, so a
//! failure drops it and the slot is left exactly as step 2 left it: empty.
//! The next borrower builds a new cache instead of inheriting a dirty one.

use crate::cache::Cache;
use crate::config::GuardConfig;
use crate::events::CacheGuardEvent;
use crate::slot::CacheSlot;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tower::{Service, ServiceExt};

#[cfg(feature = "metrics")]
use metrics::counter;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Where the cache used by a unit of work came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOrigin {
    /// The slot was empty and a new cache was built.
    Created,
    /// The cache was taken from the slot.
    Reused,
}

/// Result of a successful unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitOutcome {
    pub origin: CacheOrigin,
    /// Generation of the cache after it was returned to the slot.
    pub generation: u64,
}

/// Runs units of work against the shared cache.
///
/// `S` is the unit of work. It receives the cache by value and must hand it
/// back to have it returned to the slot.
///
/// # Example
/// ```
/// use cache_guard::{BorrowAndReturn, Cache, CacheSlot, GuardConfig};
/// use std::sync::Arc;
///
/// # async fn example() {
/// let slot = Arc::new(CacheSlot::new());
/// let config = Arc::new(GuardConfig::default());
///
/// let mut borrower = BorrowAndReturn::new(
///     Arc::clone(&slot),
///     config,
///     tower::service_fn(|mut cache: Cache| async move {
///         cache.entries_mut()[0].value = 42;
///         Ok::<_, std::io::Error>(cache)
///     }),
/// );
///
/// borrower.perform_unit_of_work().await.unwrap();
/// assert_eq!(slot.inspect(|c| c.entries()[0].value).await, Some(42));
/// # }
/// ```
#[derive(Clone)]
pub struct BorrowAndReturn<S> {
    slot: Arc<CacheSlot<Cache>>,
    config: Arc<GuardConfig>,
    work: S,
}

impl<S> BorrowAndReturn<S>
where
    S: Service<Cache, Response = Cache>,
    S::Error: fmt::Display,
{
    pub fn new(slot: Arc<CacheSlot<Cache>>, config: Arc<GuardConfig>, work: S) -> Self {
        Self { slot, config, work }
    }

    /// Performs one complete borrow, work, and return-or-discard cycle.
    ///
    /// Only one caller can be inside this method at a time across every
    /// borrower sharing the slot. On error the slot is empty afterwards.
    pub async fn perform_unit_of_work(&mut self) -> Result<UnitOutcome, S::Error> {
        let mut slot = self.slot.lock().await;

        // Readiness is checked before the take so that a service which is not
        // ready never costs the existing cache.
        let ready = self.work.ready().await.map(|_| ());
        if let Err(error) = ready {
            self.report_failure(&error);
            return Err(error);
        }

        let (cache, origin) = match slot.take() {
            Some(cache) => {
                self.config
                    .event_listeners
                    .emit(&CacheGuardEvent::CacheReused {
                        guard_name: self.config.name.clone(),
                        timestamp: Instant::now(),
                        generation: cache.generation(),
                    });

                #[cfg(feature = "tracing")]
                debug!(guard = %self.config.name, generation = cache.generation(), "grabbing the cache from the slot");

                (cache, CacheOrigin::Reused)
            }
            None => {
                let cache = Cache::with_entries(self.config.initial_cache_size);

                #[cfg(feature = "metrics")]
                counter!("cache_guard_caches_created_total", "guard" => self.config.name.clone())
                    .increment(1);

                self.config
                    .event_listeners
                    .emit(&CacheGuardEvent::CacheCreated {
                        guard_name: self.config.name.clone(),
                        timestamp: Instant::now(),
                        size: cache.len(),
                    });

                #[cfg(feature = "tracing")]
                info!(guard = %self.config.name, size = cache.len(), "created a new cache");

                (cache, CacheOrigin::Created)
            }
        };

        let mut cache = match self.work.call(cache).await {
            Ok(cache) => cache,
            Err(error) => {
                self.report_failure(&error);
                return Err(error);
            }
        };

        cache.advance_generation();
        let generation = cache.generation();
        slot.put(cache, tokio::time::Instant::now());
        drop(slot);

        #[cfg(feature = "metrics")]
        counter!("cache_guard_units_total", "guard" => self.config.name.clone(), "result" => "success")
            .increment(1);

        self.config
            .event_listeners
            .emit(&CacheGuardEvent::CacheReturned {
                guard_name: self.config.name.clone(),
                timestamp: Instant::now(),
                generation,
            });

        #[cfg(feature = "tracing")]
        debug!(guard = %self.config.name, generation, "put the cache back into the slot");

        Ok(UnitOutcome { origin, generation })
    }

    fn report_failure(&self, error: &S::Error) {
        #[cfg(feature = "metrics")]
        counter!("cache_guard_units_total", "guard" => self.config.name.clone(), "result" => "failure")
            .increment(1);

        self.config
            .event_listeners
            .emit(&CacheGuardEvent::WorkFailed {
                guard_name: self.config.name.clone(),
                timestamp: Instant::now(),
                error: error.to_string(),
            });
    }

    pub fn slot(&self) -> &Arc<CacheSlot<Cache>> {
        &self.slot
    }
}
