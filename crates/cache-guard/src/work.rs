//! The reference unit of work.
//!
//! Any `tower::Service<Cache, Response = Cache>` can act as a unit of work: it
//! receives the borrowed cache by value and hands it back on success. Dropping
//! the cache on the error path is all it takes to keep a half-mutated cache
//! out of the slot.

use crate::cache::Cache;
use crate::config::GuardConfig;
use crate::error::{GuardError, Result};
use crate::events::CacheGuardEvent;
use crate::random::RandomnessProvider;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::Service;

/// Simulated work: hold the cache for a random time, touch one entry, and
/// occasionally fail.
///
/// The entry is modified before the failure decision, so a failed unit of
/// work really does leave its cache dirty. That cache is dropped along with
/// the error.
#[derive(Clone)]
pub struct SimulatedWork {
    config: Arc<GuardConfig>,
    random: Arc<dyn RandomnessProvider>,
}

impl SimulatedWork {
    pub fn new(config: Arc<GuardConfig>, random: Arc<dyn RandomnessProvider>) -> Self {
        Self { config, random }
    }
}

impl Service<Cache> for SimulatedWork {
    type Response = Cache;
    type Error = GuardError;
    type Future = BoxFuture<'static, Result<Cache>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut cache: Cache) -> Self::Future {
        let config = Arc::clone(&self.config);
        let random = Arc::clone(&self.random);

        Box::pin(async move {
            let delay = random.duration_up_to(config.maximum_idle_time);

            config.event_listeners.emit(&CacheGuardEvent::WorkSimulated {
                guard_name: config.name.clone(),
                timestamp: Instant::now(),
                delay,
            });

            #[cfg(feature = "tracing")]
            tracing::info!(
                guard = %config.name,
                delay_ms = delay.as_millis() as u64,
                "waiting in worker"
            );

            tokio::time::sleep(delay).await;

            if !cache.is_empty() {
                let len = cache.len() as u64;
                let index = random.value_up_to(len).saturating_sub(1) as usize;
                cache.entries_mut()[index].value += 1;
            }

            if random.trigger_failure(config.failure_odds) {
                return Err(GuardError::WorkFailed);
            }

            Ok(cache)
        })
    }
}
