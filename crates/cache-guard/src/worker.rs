//! The periodic worker loop.

use crate::cache::Cache;
use crate::config::GuardConfig;
use crate::events::CacheGuardEvent;
use crate::protocol::{BorrowAndReturn, UnitOutcome};
use crate::random::RandomnessProvider;
use crate::stop::StopSignal;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tower::Service;

/// What a worker loop did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Units of work that returned the cache to the slot.
    pub completed: u64,
    /// Units of work that failed and discarded their cache.
    pub failed: u64,
}

impl WorkerReport {
    pub fn attempts(&self) -> u64 {
        self.completed + self.failed
    }
}

/// Repeatedly sleeps a random interval and then performs a unit of work.
///
/// The stop signal is checked at the top of each iteration only. An
/// iteration that has started always runs to completion, sleep included.
pub struct WorkerLoop<S> {
    borrower: BorrowAndReturn<S>,
    random: Arc<dyn RandomnessProvider>,
    stop: StopSignal,
    config: Arc<GuardConfig>,
}

impl<S> WorkerLoop<S>
where
    S: Service<Cache, Response = Cache>,
    S::Error: fmt::Display,
{
    pub fn new(
        borrower: BorrowAndReturn<S>,
        random: Arc<dyn RandomnessProvider>,
        stop: StopSignal,
        config: Arc<GuardConfig>,
    ) -> Self {
        Self {
            borrower,
            random,
            stop,
            config,
        }
    }

    /// Runs until the stop signal is raised.
    pub async fn run(mut self) -> WorkerReport {
        let mut report = WorkerReport::default();

        while !self.stop.is_stopped() {
            match self.run_iteration().await {
                Ok(_) => report.completed += 1,
                Err(_error) => {
                    report.failed += 1;

                    #[cfg(feature = "tracing")]
                    tracing::warn!(guard = %self.config.name, error = %_error, "caught a failed unit of work");
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            guard = %self.config.name,
            completed = report.completed,
            failed = report.failed,
            "worker loop stopped"
        );

        report
    }

    /// One iteration: sleep up to `maximum_time_worker`, then borrow the cache.
    pub async fn run_iteration(&mut self) -> Result<UnitOutcome, S::Error> {
        let delay = self.random.duration_up_to(self.config.maximum_time_worker);

        self.config
            .event_listeners
            .emit(&CacheGuardEvent::WorkerWaiting {
                guard_name: self.config.name.clone(),
                timestamp: Instant::now(),
                delay,
            });

        #[cfg(feature = "tracing")]
        tracing::info!(
            guard = %self.config.name,
            delay_ms = delay.as_millis() as u64,
            "waiting in worker loop"
        );

        tokio::time::sleep(delay).await;

        self.borrower.perform_unit_of_work().await
    }
}
