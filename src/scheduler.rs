// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::SyncError;
use crate::service::SyncService;

/// Spawn the periodic sync loop. The first run fires one full `every` after start.
pub fn spawn_scheduler(service: Arc<SyncService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(target: "sync", interval_secs = every.as_secs(), "scheduler started");
        loop {
            ticker.tick().await;
            match service.run_once().await {
                Ok(res) if res.success => {
                    if let Some(s) = res.summary {
                        tracing::info!(
                            target: "sync",
                            total = s.total,
                            created = s.successful,
                            duplicates = s.duplicates,
                            failed = s.failed,
                            keywords = s.keywords_processed,
                            "scheduled run done"
                        );
                    }
                }
                Ok(res) => {
                    tracing::info!(target: "sync", reason = res.error.as_deref().unwrap_or(""), "scheduled run skipped");
                }
                Err(SyncError::AlreadyRunning) => {
                    tracing::info!(target: "sync", "previous run still active, tick skipped");
                }
                Err(e) => {
                    tracing::error!(target: "sync", error = %e, "scheduled run failed");
                }
            }
        }
    })
}
