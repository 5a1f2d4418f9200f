//! Runs the reference configuration for thirty seconds.
//!
//! ```bash
//! RUST_LOG=debug cargo run -p cache-guard
//! ```

use cache_guard::{GuardConfig, Orchestrator, DEFAULT_RUN_DURATION};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GuardConfig::builder()
        .name("cache-guard")
        .on_cache_evicted(|idle| {
            tracing::debug!(idle_ms = idle.as_millis() as u64, "eviction listener fired");
        })
        .build();

    let summary = Orchestrator::new(config)
        .run_for(DEFAULT_RUN_DURATION)
        .await;

    tracing::info!(
        completed = summary.workers.completed,
        failed = summary.workers.failed,
        evictions = summary.reaper.evictions,
        busy_ticks = summary.reaper.busy,
        "run finished"
    );
}
