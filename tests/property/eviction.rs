//! Property tests for the eviction threshold.
//!
//! Invariants tested:
//! - A cache idle for at most `maximum_unused_time` is kept
//! - A cache idle for longer is evicted, and only once

use cache_guard::{Cache, CacheSlot, EvictionReaper, GuardConfig, ReapOutcome, StopSignal};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::time::Instant;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: eviction happens exactly when idle time exceeds the limit
    #[test]
    fn eviction_matches_the_threshold(limit_ms in 0u64..500, idle_ms in 0u64..1_000) {
        let rt = Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let returned = Instant::now();
            let slot = Arc::new(CacheSlot::with_cache(Cache::with_entries(1), returned));
            let config = GuardConfig::builder()
                .maximum_unused_time(Duration::from_millis(limit_ms))
                .build();
            let reaper = EvictionReaper::new(Arc::clone(&slot), StopSignal::new(), Arc::new(config));

            let now = returned + Duration::from_millis(idle_ms);
            let outcome = reaper.tick_at(now);

            if idle_ms > limit_ms {
                prop_assert_eq!(outcome, ReapOutcome::Evicted(Duration::from_millis(idle_ms)));
                prop_assert!(!slot.is_occupied().await);
                prop_assert_eq!(reaper.tick_at(now), ReapOutcome::Empty);
            } else {
                prop_assert_eq!(outcome, ReapOutcome::Fresh(Duration::from_millis(idle_ms)));
                prop_assert!(slot.is_occupied().await);
            }

            Ok(())
        })?;
    }
}
