//! Property tests for the borrow-and-return protocol.
//!
//! Invariants tested:
//! - After a failed unit of work the slot is empty
//! - After a successful unit of work the slot holds a cache whose generation
//!   counts the successes since the last failure
//! - A dirty cache from a failed unit of work is never observed again

use cache_guard::{Cache, CacheGuard, CacheOrigin, GuardConfig, GuardError};
use proptest::prelude::*;
use tokio::runtime::Builder;

/// Marks entry 0 with the attempt number, then succeeds or fails.
fn marking_work(
    outcomes: Vec<bool>,
) -> impl tower::Service<Cache, Response = Cache, Error = GuardError> {
    let outcomes = std::sync::Arc::new(outcomes);
    let attempt = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    tower::service_fn(move |mut cache: Cache| {
        let n = attempt.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let succeed = outcomes.get(n).copied().unwrap_or(true);
        async move {
            cache.entries_mut()[0].value = n as i64 + 1;
            if succeed {
                Ok(cache)
            } else {
                Err(GuardError::WorkFailed)
            }
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the slot only ever holds a cache from a successful unit of work
    #[test]
    fn slot_state_follows_the_last_outcome(outcomes in prop::collection::vec(any::<bool>(), 1..40)) {
        let rt = Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let guard = CacheGuard::new(GuardConfig::builder().initial_cache_size(4).build());
            let mut borrower = guard.borrower(marking_work(outcomes.clone()));

            let mut streak = 0u64;
            let mut previous_ok = false;
            for (n, succeed) in outcomes.iter().copied().enumerate() {
                let result = borrower.perform_unit_of_work().await;
                prop_assert_eq!(result.is_ok(), succeed);

                if succeed {
                    streak += 1;
                    let outcome = result.unwrap();
                    let expected = if previous_ok { CacheOrigin::Reused } else { CacheOrigin::Created };
                    prop_assert_eq!(outcome.origin, expected);
                    prop_assert_eq!(outcome.generation, streak);

                    let marker = guard.slot().inspect(|c| c.entries()[0].value).await;
                    prop_assert_eq!(marker, Some(n as i64 + 1));
                } else {
                    streak = 0;
                    prop_assert!(!guard.slot().is_occupied().await);
                }
                previous_ok = succeed;
            }

            Ok(())
        })?;
    }

    /// Property: a fresh cache always has the configured size and clean entries
    #[test]
    fn fresh_caches_are_clean(size in 1usize..2_000, failures_first in 0usize..5) {
        let rt = Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let guard = CacheGuard::new(GuardConfig::builder().initial_cache_size(size).build());
            let mut outcomes = vec![false; failures_first];
            outcomes.push(true);
            let mut borrower = guard.borrower(marking_work(outcomes));

            for _ in 0..failures_first {
                prop_assert!(borrower.perform_unit_of_work().await.is_err());
            }
            let outcome = borrower.perform_unit_of_work().await.unwrap();
            prop_assert_eq!(outcome.origin, CacheOrigin::Created);

            let (len, clean_tail) = guard
                .slot()
                .inspect(|c| (c.len(), c.entries()[1..].iter().all(|e| e.value == 0)))
                .await
                .unwrap();
            prop_assert_eq!(len, size);
            prop_assert!(clean_tail);

            Ok(())
        })?;
    }
}
