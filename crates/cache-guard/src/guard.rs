//! The explicitly passed context tying the slot, the stop signal, and the
//! configuration together.

use crate::cache::Cache;
use crate::config::GuardConfig;
use crate::protocol::BorrowAndReturn;
use crate::random::RandomnessProvider;
use crate::reaper::EvictionReaper;
use crate::slot::CacheSlot;
use crate::stop::StopSignal;
use crate::work::SimulatedWork;
use crate::worker::WorkerLoop;
use std::fmt;
use std::sync::Arc;
use tower::Service;

/// Shared context for everything that touches the guarded cache.
///
/// Cloning is cheap and every clone refers to the same slot and stop signal.
///
/// # Example
/// ```
/// use cache_guard::{CacheGuard, GuardConfig, SeededRandomness};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() {
/// let guard = CacheGuard::new(GuardConfig::default());
/// let random = Arc::new(SeededRandomness::with_seed(7));
///
/// let worker = tokio::spawn(guard.simulated_worker(random).run());
/// let reaper = tokio::spawn(guard.reaper().run());
///
/// tokio::time::sleep(Duration::from_secs(1)).await;
/// guard.stop();
///
/// let worker_report = worker.await.unwrap();
/// let reaper_report = reaper.await.unwrap();
/// println!("{:?} {:?}", worker_report, reaper_report);
/// # }
/// ```
#[derive(Clone)]
pub struct CacheGuard {
    slot: Arc<CacheSlot<Cache>>,
    stop: StopSignal,
    config: Arc<GuardConfig>,
}

impl CacheGuard {
    /// Creates a context with an empty slot.
    pub fn new(config: GuardConfig) -> Self {
        Self {
            slot: Arc::new(CacheSlot::new()),
            stop: StopSignal::new(),
            config: Arc::new(config),
        }
    }

    pub fn slot(&self) -> &Arc<CacheSlot<Cache>> {
        &self.slot
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub fn config(&self) -> &Arc<GuardConfig> {
        &self.config
    }

    /// Raises the stop signal for every loop built from this context.
    pub fn stop(&self) -> bool {
        self.stop.stop()
    }

    /// A borrower that runs `work` as its unit of work.
    pub fn borrower<S>(&self, work: S) -> BorrowAndReturn<S>
    where
        S: Service<Cache, Response = Cache>,
        S::Error: fmt::Display,
    {
        BorrowAndReturn::new(Arc::clone(&self.slot), Arc::clone(&self.config), work)
    }

    /// A worker loop running `work`.
    pub fn worker<S>(&self, work: S, random: Arc<dyn RandomnessProvider>) -> WorkerLoop<S>
    where
        S: Service<Cache, Response = Cache>,
        S::Error: fmt::Display,
    {
        WorkerLoop::new(
            self.borrower(work),
            random,
            self.stop.clone(),
            Arc::clone(&self.config),
        )
    }

    /// A worker loop running [`SimulatedWork`] drawn from `random`.
    pub fn simulated_worker(
        &self,
        random: Arc<dyn RandomnessProvider>,
    ) -> WorkerLoop<SimulatedWork> {
        let work = SimulatedWork::new(Arc::clone(&self.config), Arc::clone(&random));
        self.worker(work, random)
    }

    pub fn reaper(&self) -> EvictionReaper {
        EvictionReaper::new(
            Arc::clone(&self.slot),
            self.stop.clone(),
            Arc::clone(&self.config),
        )
    }
}

impl fmt::Debug for CacheGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheGuard")
            .field("name", &self.config.name)
            .field("stopped", &self.stop.is_stopped())
            .finish()
    }
}
