//! Starts the worker loops and the reaper, runs them for a while, and stops them.

use crate::config::GuardConfig;
use crate::guard::CacheGuard;
use crate::random::{RandomnessProvider, SeededRandomness};
use crate::reaper::ReaperReport;
use crate::worker::WorkerReport;
use std::sync::Arc;
use std::time::Duration;

/// How long the demo binary runs.
pub const DEFAULT_RUN_DURATION: Duration = Duration::from_secs(30);

/// Totals collected once every task has been joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Reports of all worker loops, summed.
    pub workers: WorkerReport,
    pub reaper: ReaperReport,
    /// Tasks that ended in a panic instead of a report.
    pub panicked_tasks: usize,
}

/// Thin driver around a [`CacheGuard`].
pub struct Orchestrator {
    guard: CacheGuard,
    random: Arc<dyn RandomnessProvider>,
}

impl Orchestrator {
    /// Creates an orchestrator drawing randomness from the operating system.
    pub fn new(config: GuardConfig) -> Self {
        Self {
            guard: CacheGuard::new(config),
            random: Arc::new(SeededRandomness::from_entropy()),
        }
    }

    /// Replaces the randomness provider shared by all worker loops.
    pub fn with_randomness(mut self, random: Arc<dyn RandomnessProvider>) -> Self {
        self.random = random;
        self
    }

    pub fn guard(&self) -> &CacheGuard {
        &self.guard
    }

    /// Runs every loop for `duration`, then raises the stop signal and waits
    /// for all of them.
    ///
    /// Shutdown takes at most one more iteration of the slowest loop
    /// ([`GuardConfig::longest_iteration`]). Tasks are joined, never aborted.
    pub async fn run_for(self, duration: Duration) -> RunSummary {
        let config = Arc::clone(self.guard.config());

        #[cfg(feature = "tracing")]
        tracing::info!(
            guard = %config.name,
            workers = config.worker_count,
            run_ms = duration.as_millis() as u64,
            "starting worker loops and reaper"
        );

        let workers: Vec<_> = (0..config.worker_count)
            .map(|_| tokio::spawn(self.guard.simulated_worker(Arc::clone(&self.random)).run()))
            .collect();
        let reaper = tokio::spawn(self.guard.reaper().run());

        tokio::time::sleep(duration).await;
        self.guard.stop();

        let mut summary = RunSummary::default();

        for handle in workers {
            match handle.await {
                Ok(report) => {
                    summary.workers.completed += report.completed;
                    summary.workers.failed += report.failed;
                }
                Err(_error) => {
                    summary.panicked_tasks += 1;

                    #[cfg(feature = "tracing")]
                    tracing::error!(guard = %config.name, error = %_error, "worker loop terminated abnormally");
                }
            }
        }

        match reaper.await {
            Ok(report) => summary.reaper = report,
            Err(_error) => {
                summary.panicked_tasks += 1;

                #[cfg(feature = "tracing")]
                tracing::error!(guard = %config.name, error = %_error, "reaper terminated abnormally");
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            guard = %config.name,
            completed = summary.workers.completed,
            failed = summary.workers.failed,
            evictions = summary.reaper.evictions,
            "all loops stopped"
        );

        summary
    }
}
