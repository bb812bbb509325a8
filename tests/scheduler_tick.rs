// tests/scheduler_tick.rs
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Harness, MockSearch, MockSource};
use keyword_post_sync::config::ScheduleConfig;
use keyword_post_sync::scheduler::spawn_scheduler;
use keyword_post_sync::service::SyncService;

async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn first_run_fires_after_one_full_interval() {
    let h = Harness::new(
        MockSource::with(&["k1"]),
        MockSearch::new().returns("k1", &["https://in/p/1"]),
    );
    let service = Arc::new(SyncService::new(
        h.pipeline(10, vec![]),
        &ScheduleConfig::default(),
    ));
    let handle = spawn_scheduler(service.clone(), Duration::from_secs(3600));

    settle().await;
    assert_eq!(h.source.calls(), 0);

    tokio::time::advance(Duration::from_secs(3599)).await;
    settle().await;
    assert_eq!(h.source.calls(), 0);

    tokio::time::advance(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(h.source.calls(), 1);
    assert_eq!(service.scheduler_status().last_run_success, Some(true));

    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(h.source.calls(), 2);

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn failing_runs_keep_the_loop_alive() {
    let h = Harness::new(MockSource::failing(), MockSearch::new());
    let service = Arc::new(SyncService::new(
        h.pipeline(10, vec![]),
        &ScheduleConfig::default(),
    ));
    let handle = spawn_scheduler(service.clone(), Duration::from_secs(60));

    for expected in 1..=3 {
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(h.source.calls(), expected);
    }
    assert_eq!(service.scheduler_status().last_run_success, Some(false));
    assert!(!handle.is_finished());
    handle.abort();
}
