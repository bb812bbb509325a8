//! Keyword post sync: service entrypoint.
//! Boots the Axum HTTP server, the metrics endpoint and the daily scheduler.

use std::time::Duration;

use shuttle_axum::ShuttleAxum;

use keyword_post_sync::{
    api::{self, AppState},
    bootstrap,
    config::SyncConfig,
    init_tracing,
    metrics::Metrics,
    scheduler::spawn_scheduler,
};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = SyncConfig::from_env().map_err(shuttle_runtime::Error::Custom)?;
    let service = bootstrap::build_service(&cfg).map_err(shuttle_runtime::Error::Custom)?;

    if cfg.schedule.enabled {
        spawn_scheduler(service.clone(), Duration::from_secs(cfg.schedule.interval_secs));
    } else {
        tracing::info!(target: "sync", "scheduler disabled");
    }

    let mut router = api::create_router(AppState::new(service));
    match Metrics::init(cfg.quota.daily_limit) {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = %e, "metrics endpoint disabled"),
    }

    Ok(router.into())
}
