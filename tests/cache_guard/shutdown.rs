//! Stop signal handling and the orchestrator.

use cache_guard::{
    CacheGuard, FixedRandomness, GuardConfig, Orchestrator, SeededRandomness, WorkerReport,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn shutdown_is_bounded_by_the_longest_iteration() {
    let config = GuardConfig::default();
    let bound = config.longest_iteration();
    let run = Duration::from_secs(3);

    let start = Instant::now();
    let summary = Orchestrator::new(config)
        .with_randomness(Arc::new(SeededRandomness::with_seed(5)))
        .run_for(run)
        .await;
    let elapsed = start.elapsed();

    assert!(elapsed >= run);
    assert!(elapsed <= run + bound, "shutdown took {:?}", elapsed - run);
    assert_eq!(summary.panicked_tasks, 0);
}

#[tokio::test(start_paused = true)]
async fn loops_exit_after_their_current_iteration() {
    let guard = CacheGuard::new(
        GuardConfig::builder()
            .maximum_time_worker(Duration::from_millis(40))
            .maximum_idle_time(Duration::from_millis(40))
            .clear_cache_interval(Duration::from_millis(60))
            .build(),
    );
    let worker = tokio::spawn(
        guard
            .simulated_worker(Arc::new(FixedRandomness::new(40)))
            .run(),
    );
    let reaper = tokio::spawn(guard.reaper().run());

    // Worker: iterations end at 80, 160. Reaper: ticks at 60, 120, 180.
    tokio::time::sleep(Duration::from_millis(100)).await;
    guard.stop();

    let worker_report = worker.await.unwrap();
    let reaper_report = reaper.await.unwrap();

    assert_eq!(
        worker_report,
        WorkerReport {
            completed: 2,
            failed: 0
        }
    );
    assert_eq!(reaper_report.ticks, 2);
}

#[tokio::test(start_paused = true)]
async fn reference_run_reports_observable_events() {
    let created = Arc::new(AtomicUsize::new(0));
    let returned = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let evicted = Arc::new(AtomicUsize::new(0));
    let (c, r, f, e) = (
        Arc::clone(&created),
        Arc::clone(&returned),
        Arc::clone(&failed),
        Arc::clone(&evicted),
    );

    let config = GuardConfig::builder()
        .on_cache_created(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .on_cache_returned(move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        })
        .on_work_failed(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        })
        .on_cache_evicted(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let summary = Orchestrator::new(config)
        .with_randomness(Arc::new(SeededRandomness::with_seed(2024)))
        .run_for(Duration::from_secs(30))
        .await;

    assert_eq!(returned.load(Ordering::SeqCst) as u64, summary.workers.completed);
    assert_eq!(failed.load(Ordering::SeqCst) as u64, summary.workers.failed);
    assert_eq!(evicted.load(Ordering::SeqCst) as u64, summary.reaper.evictions);
    assert!(summary.workers.attempts() > 50);
    // Every attempt starts from either a created or a reused cache; at least
    // the first one must have been created.
    assert!(created.load(Ordering::SeqCst) >= 1);
    assert!(summary.reaper.evictions > 0);
}
