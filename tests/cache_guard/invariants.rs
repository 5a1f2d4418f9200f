//! Slot invariants under failure, panics, and repeated eviction.

use super::{ScriptedWork, DIRTY};
use cache_guard::{Cache, CacheGuard, GuardConfig, GuardError, ReapOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn slot_never_holds_a_cache_from_a_failed_unit() {
    let script = [true, true, false, true, false, false, true, true, false];
    let guard = CacheGuard::new(GuardConfig::builder().initial_cache_size(16).build());
    let mut borrower = guard.borrower(ScriptedWork::new(script));

    let mut expected_generation = 0;
    for succeed in script {
        let result = borrower.perform_unit_of_work().await;
        assert_eq!(result.is_ok(), succeed);

        if succeed {
            expected_generation += 1;
            let generation = guard.slot().inspect(Cache::generation).await;
            assert_eq!(generation, Some(expected_generation));
        } else {
            expected_generation = 0;
            assert!(!guard.slot().is_occupied().await);
            assert!(guard.slot().lock().await.last_access().is_none());
        }
    }
}

#[tokio::test]
async fn failure_on_empty_slot_leaves_it_empty() {
    let guard = CacheGuard::new(GuardConfig::default());
    let result = guard
        .borrower(ScriptedWork::new([false]))
        .perform_unit_of_work()
        .await;

    assert_eq!(result, Err(GuardError::WorkFailed));
    assert!(!guard.slot().is_occupied().await);
}

#[tokio::test]
async fn the_slot_is_unreachable_while_a_unit_owns_the_cache() {
    let guard = CacheGuard::new(GuardConfig::default());
    let probe = guard.clone();
    let checked = Arc::new(AtomicBool::new(false));
    let c = Arc::clone(&checked);

    guard
        .borrower(tower::service_fn(move |cache: Cache| {
            let probe = probe.clone();
            let checked = Arc::clone(&c);
            async move {
                assert!(probe.slot().try_lock().is_none());
                assert_eq!(probe.reaper().tick(), ReapOutcome::Busy);
                checked.store(true, Ordering::SeqCst);
                Ok::<_, GuardError>(cache)
            }
        }))
        .perform_unit_of_work()
        .await
        .unwrap();

    assert!(checked.load(Ordering::SeqCst));
    assert!(guard.slot().is_occupied().await);
}

#[tokio::test]
async fn panicking_unit_drops_the_cache_and_releases_the_slot() {
    let guard = CacheGuard::new(GuardConfig::default());
    guard
        .borrower(ScriptedWork::always_succeed())
        .perform_unit_of_work()
        .await
        .unwrap();

    let mut panicking = guard.borrower(tower::service_fn(|mut cache: Cache| async move {
        cache.entries_mut()[0].value = DIRTY;
        if cache.len() > 0 {
            panic!("unit of work blew up");
        }
        Ok::<_, GuardError>(cache)
    }));
    let handle = tokio::spawn(async move { panicking.perform_unit_of_work().await });

    let error = handle.await.unwrap_err();
    assert!(error.is_panic());

    // No poisoning: the slot is usable and simply empty.
    let slot = guard.slot().try_lock().expect("slot should be free");
    assert!(!slot.is_occupied());
}

#[tokio::test(start_paused = true)]
async fn repeated_eviction_is_a_no_op() {
    let guard = CacheGuard::new(GuardConfig::default());
    let reaper = guard.reaper();
    guard
        .borrower(ScriptedWork::always_succeed())
        .perform_unit_of_work()
        .await
        .unwrap();

    tokio::time::advance(Duration::from_millis(100)).await;
    assert!(matches!(reaper.tick(), ReapOutcome::Evicted(_)));

    for _ in 0..5 {
        tokio::time::advance(Duration::from_millis(60)).await;
        assert_eq!(reaper.tick(), ReapOutcome::Empty);
    }
    assert!(!guard.slot().clear().await);
}

#[tokio::test(start_paused = true)]
async fn threshold_boundary_is_strictly_greater() {
    let guard = CacheGuard::new(
        GuardConfig::builder()
            .maximum_unused_time(Duration::from_millis(30))
            .build(),
    );
    let reaper = guard.reaper();
    guard
        .borrower(ScriptedWork::always_succeed())
        .perform_unit_of_work()
        .await
        .unwrap();

    tokio::time::advance(Duration::from_millis(30)).await;
    assert_eq!(reaper.tick(), ReapOutcome::Fresh(Duration::from_millis(30)));
    assert!(guard.slot().is_occupied().await);

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(reaper.tick(), ReapOutcome::Evicted(Duration::from_millis(31)));
    assert!(!guard.slot().is_occupied().await);
}
