use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tracing::{debug, error, info, warn};

use crate::health::HealthMonitor;
use crate::queue::QueueStore;

/// Queued tasks older than this are dropped by the sweep
pub const RETENTION_HOURS: i64 = 24;

/// How often the watch loop runs an eviction sweep
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// How often the watch loop probes the companion app
pub const PROBE_INTERVAL: Duration = Duration::from_secs(60);

/// One eviction pass over the queue. Silent maintenance: logs what it did,
/// reports nothing upstream.
pub async fn sweep(store: &QueueStore) -> Result<usize> {
    let evicted = store
        .evict_stale(chrono::Duration::hours(RETENTION_HOURS))
        .await?;
    if evicted > 0 {
        info!(
            "🧹 Evicted {} task(s) older than {} hours",
            evicted, RETENTION_HOURS
        );
    } else {
        debug!("No stale tasks to evict");
    }
    Ok(evicted)
}

/// Long-running maintenance loop: hourly eviction sweep plus a periodic
/// connection probe for status logging. Returns once ctrl-c is received.
pub async fn run(store: &QueueStore, monitor: &HealthMonitor) -> Result<()> {
    let mut sweep_timer = tokio::time::interval(SWEEP_INTERVAL);
    let mut probe_timer = tokio::time::interval(PROBE_INTERVAL);

    // Set up signal handling for graceful shutdown
    tokio::pin! {
        let shutdown_signal = signal::ctrl_c();
    }

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("🛑 Shutdown signal received. Exiting gracefully.");
                break;
            }

            _ = sweep_timer.tick() => {
                if let Err(e) = sweep(store).await {
                    error!("Eviction sweep failed: {}", e);
                }
            }

            _ = probe_timer.tick() => {
                let status = monitor.check().await;
                if status.connected {
                    debug!("Companion app reachable: {}", status.message);
                } else {
                    warn!("⚠️ Companion app unreachable: {}", status.message);
                }
            }
        }
    }

    Ok(())
}
