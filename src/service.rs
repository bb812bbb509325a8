// src/service.rs
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex as RunLock, OwnedMutexGuard};

use crate::config::ScheduleConfig;
use crate::error::{Result, SyncError};
use crate::pipeline::{Pipeline, RunResult};
use crate::quota::QuotaStats;
use crate::types::Keyword;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub enabled: bool,
    pub interval_secs: u64,
    pub running: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_run_success: Option<bool>,
}

/// The pipeline behind a single-active-run guard.
///
/// A run requested while another one is in flight fails with
/// `AlreadyRunning` and never touches the quota. An accepted run executes on
/// its own task, so dropping the caller's future (an abandoned HTTP request)
/// does not stop it before the quota advance.
pub struct SyncService {
    pipeline: Arc<Pipeline>,
    run_lock: Arc<RunLock<()>>,
    status: Arc<Mutex<SchedulerStatus>>,
}

/// Held by the run task; releases the run lock and clears `running` when the
/// task ends, including by panic.
struct ActiveRun {
    status: Arc<Mutex<SchedulerStatus>>,
    _lock: OwnedMutexGuard<()>,
}

impl ActiveRun {
    fn finish(&self, res: &Result<RunResult>) {
        let mut st = self.status.lock().expect("status mutex poisoned");
        st.last_run_at = Some(Utc::now());
        st.last_run_success = Some(matches!(res, Ok(r) if r.success));
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        if let Ok(mut st) = self.status.lock() {
            st.running = false;
        }
    }
}

impl SyncService {
    pub fn new(pipeline: Pipeline, schedule: &ScheduleConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            run_lock: Arc::new(RunLock::new(())),
            status: Arc::new(Mutex::new(SchedulerStatus {
                enabled: schedule.enabled,
                interval_secs: schedule.interval_secs,
                ..SchedulerStatus::default()
            })),
        }
    }

    pub async fn run_once(&self) -> Result<RunResult> {
        self.spawn_run(None).await
    }

    pub async fn run_with_keywords(&self, keywords: Vec<Keyword>) -> Result<RunResult> {
        self.spawn_run(Some(keywords)).await
    }

    pub async fn stats(&self) -> Result<QuotaStats> {
        self.pipeline.stats().await
    }

    pub fn scheduler_status(&self) -> SchedulerStatus {
        self.status.lock().expect("status mutex poisoned").clone()
    }

    async fn spawn_run(&self, keywords: Option<Vec<Keyword>>) -> Result<RunResult> {
        let lock = self
            .run_lock
            .clone()
            .try_lock_owned()
            .map_err(|_| SyncError::AlreadyRunning)?;
        self.status.lock().expect("status mutex poisoned").running = true;
        let active = ActiveRun {
            status: self.status.clone(),
            _lock: lock,
        };

        let pipeline = self.pipeline.clone();
        let task = tokio::spawn(async move {
            let res = match keywords {
                Some(k) => pipeline.run_with_keywords(k).await,
                None => pipeline.run_once().await,
            };
            active.finish(&res);
            res
        });
        task.await
            .map_err(|e| SyncError::RunAborted(e.to_string()))?
    }
}
