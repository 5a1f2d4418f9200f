//! Randomness used by the worker loop and the simulated unit of work.
//!
//! The guard never calls into `rand` directly. Everything goes through
//! [`RandomnessProvider`], so tests can swap in a provider that always fails,
//! never fails, or always waits the same amount of time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

/// Range of the roll used by the failure trigger for odds up to this value.
///
/// Larger odds roll `1..=odds` instead, since no multiple of them fits.
const FAILURE_ROLL_UPPER: u64 = 1000;

/// Source of bounded random values and random failures.
pub trait RandomnessProvider: Send + Sync {
    /// Returns a value in `1..=upper`, or `0` when `upper` is `0`.
    fn value_up_to(&self, upper: u64) -> u64;

    /// Returns true when the current unit of work should fail.
    ///
    /// `odds` of 17 means roughly one failure in seventeen attempts.
    fn trigger_failure(&self, odds: u64) -> bool;

    /// Returns a duration in whole milliseconds within `1ms..=upper`.
    ///
    /// Bounds below one millisecond truncate to zero and yield `Duration::ZERO`.
    fn duration_up_to(&self, upper: Duration) -> Duration {
        let upper_ms = u64::try_from(upper.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(self.value_up_to(upper_ms))
    }
}

/// [`RandomnessProvider`] backed by a [`StdRng`].
#[derive(Debug)]
pub struct SeededRandomness {
    rng: Mutex<StdRng>,
}

impl SeededRandomness {
    /// Creates a provider seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a reproducible provider. Same seed, same sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn roll(&self, upper: u64) -> u64 {
        if upper == 0 {
            return 0;
        }
        // A poisoned lock only means another thread panicked mid-roll; the
        // generator state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(1..=upper)
    }
}

impl Default for SeededRandomness {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomnessProvider for SeededRandomness {
    fn value_up_to(&self, upper: u64) -> u64 {
        self.roll(upper)
    }

    fn trigger_failure(&self, odds: u64) -> bool {
        if odds == 0 {
            return false;
        }
        if odds > FAILURE_ROLL_UPPER {
            return self.roll(odds) == 1;
        }
        self.roll(FAILURE_ROLL_UPPER) % odds == 0
    }
}

/// Deterministic provider: a fixed value and a fixed failure decision.
///
/// # Example
/// ```
/// use cache_guard::{FixedRandomness, RandomnessProvider};
///
/// let always_fail = FixedRandomness::new(5).failing(true);
/// assert_eq!(always_fail.value_up_to(100), 5);
/// assert!(always_fail.trigger_failure(17));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedRandomness {
    value: u64,
    fail: bool,
}

impl FixedRandomness {
    /// Always returns `value` (clamped to the requested upper bound) and never fails.
    pub fn new(value: u64) -> Self {
        Self { value, fail: false }
    }

    /// Sets whether every unit of work fails.
    pub fn failing(mut self, fail: bool) -> Self {
        self.fail = fail;
        self
    }
}

impl RandomnessProvider for FixedRandomness {
    fn value_up_to(&self, upper: u64) -> u64 {
        self.value.min(upper)
    }

    fn trigger_failure(&self, _odds: u64) -> bool {
        self.fail
    }
}
