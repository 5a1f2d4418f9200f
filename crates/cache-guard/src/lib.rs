//! Failure-safe sharing of one expensive cache between concurrent workers.
//!
//! A single cache lives in a lock-protected [`CacheSlot`]. Workers borrow it by
//! moving it out of the slot, run a unit of work on it, and move it back only
//! if the work succeeded. A failed unit of work drops the cache it was holding,
//! so the slot can never be left with a half-modified cache. An independent
//! [`EvictionReaper`] drops the cache once it has sat unused for too long, and
//! never waits for a worker to do so.
//!
//! # Features
//!
//! - **Ownership transfer**: the cache moves by value through a
//!   `tower::Service<Cache, Response = Cache>`; there is no rollback code
//! - **Serialized units of work**: the slot stays locked for the whole borrow
//! - **Best-effort eviction**: the reaper uses `try_lock` and skips busy ticks
//! - **Deterministic testing**: randomness sits behind [`RandomnessProvider`]
//! - **Event System**: observe creation, reuse, failure, and eviction
//!
//! # Example
//!
//! ```
//! use cache_guard::{CacheGuard, CacheOrigin, GuardConfig};
//!
//! # async fn example() {
//! let guard = CacheGuard::new(GuardConfig::default());
//! let mut borrower = guard.borrower(tower::service_fn(|mut cache: cache_guard::Cache| async move {
//!     cache.entries_mut()[0].value += 1;
//!     Ok::<_, std::io::Error>(cache)
//! }));
//!
//! let outcome = borrower.perform_unit_of_work().await.unwrap();
//! assert_eq!(outcome.origin, CacheOrigin::Created);
//! assert!(guard.slot().is_occupied().await);
//! # }
//! ```
//!
//! # Failure Safety
//!
//! ```
//! use cache_guard::{CacheGuard, GuardConfig, GuardError};
//!
//! # async fn example() {
//! let guard = CacheGuard::new(GuardConfig::default());
//! let mut failing = guard.borrower(tower::service_fn(|mut cache: cache_guard::Cache| async move {
//!     cache.entries_mut()[0].value = -1; // dirty the cache...
//!     Err::<cache_guard::Cache, _>(GuardError::WorkFailed) // ...and fail
//! }));
//!
//! assert!(failing.perform_unit_of_work().await.is_err());
//! // The dirty cache went down with the failed unit of work.
//! assert!(!guard.slot().is_occupied().await);
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod orchestrator;
pub mod protocol;
pub mod random;
pub mod reaper;
pub mod slot;
pub mod stop;
pub mod work;
pub mod worker;

pub use cache::{Cache, CacheEntry, DEFAULT_CACHE_SIZE};
pub use config::{GuardConfig, GuardConfigBuilder};
pub use error::GuardError;
pub use events::CacheGuardEvent;
pub use guard::CacheGuard;
pub use orchestrator::{Orchestrator, RunSummary, DEFAULT_RUN_DURATION};
pub use protocol::{BorrowAndReturn, CacheOrigin, UnitOutcome};
pub use random::{FixedRandomness, RandomnessProvider, SeededRandomness};
pub use reaper::{EvictionReaper, ReapOutcome, ReaperReport};
pub use slot::{CacheSlot, SlotGuard, SlotState};
pub use stop::StopSignal;
pub use work::SimulatedWork;
pub use worker::{WorkerLoop, WorkerReport};

pub use cache_guard_core::{
    EventListener, EventListeners, FnListener, LifecycleEvent, TypedListener,
};
