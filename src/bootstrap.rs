// src/bootstrap.rs
//! Wire a [`SyncService`] from [`SyncConfig`]: quota store, keyword source,
//! search provider and the enabled sinks.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use crate::clickup::ClickUpClient;
use crate::config::SyncConfig;
use crate::keywords::{clickup::ClickUpKeywordSource, KeywordSource, UnconfiguredSource};
use crate::pipeline::Pipeline;
use crate::quota::{JsonFileQuotaStore, QuotaTracker};
use crate::search::{apify::ApifySearch, ContentSearch, UnconfiguredSearch};
use crate::service::SyncService;
use crate::sinks::{clickup::ClickUpSink, hubspot::HubSpotSink, RecordSink};

pub fn build_pipeline(cfg: &SyncConfig) -> anyhow::Result<Pipeline> {
    let store = Arc::new(JsonFileQuotaStore::new(cfg.quota.state_path.clone()));
    let quota = QuotaTracker::with_system_clock(store, cfg.quota.daily_limit);

    let clickup = match cfg.clickup.token.clone() {
        Some(token) => Some(ClickUpClient::new(token, &cfg.clickup).context("clickup client")?),
        None => None,
    };

    let keywords: Arc<dyn KeywordSource> = match &clickup {
        Some(client) => Arc::new(ClickUpKeywordSource::new(
            client.clone(),
            cfg.clickup.keywords_list_id.clone(),
        )),
        None => {
            warn!(target: "sync", "CLICKUP_API_TOKEN not set; scheduled runs will fail to load keywords");
            Arc::new(UnconfiguredSource::new("CLICKUP_API_TOKEN not set"))
        }
    };

    let search: Arc<dyn ContentSearch> = match cfg.apify.token.clone() {
        Some(token) => Arc::new(
            ApifySearch::new(token, cfg.apify.clone(), cfg.locale.filter())
                .context("apify client")?,
        ),
        None => {
            warn!(target: "search", "APIFY_API_TOKEN not set; every search will fail");
            Arc::new(UnconfiguredSearch::new("APIFY_API_TOKEN not set"))
        }
    };

    let mut pipeline = Pipeline::new(quota, keywords, search)
        .with_keyword_delay(Duration::from_millis(cfg.pacing.keyword_delay_ms));

    for sink in build_sinks(cfg, clickup)? {
        pipeline = pipeline.with_sink(sink);
    }
    info!(target: "sync", sinks = ?pipeline.sink_ids(), daily_limit = cfg.quota.daily_limit, "pipeline ready");
    Ok(pipeline)
}

fn build_sinks(
    cfg: &SyncConfig,
    clickup: Option<ClickUpClient>,
) -> anyhow::Result<Vec<Arc<dyn RecordSink>>> {
    let mut sinks: Vec<Arc<dyn RecordSink>> = Vec::new();
    if cfg.clickup.sink_enabled {
        match clickup {
            Some(client) => sinks.push(Arc::new(ClickUpSink::new(
                client,
                cfg.clickup.posts_list_id.clone(),
            ))),
            None => warn!(target: "sink", sink = "clickup", "sink enabled but no token, skipped"),
        }
    }
    if cfg.hubspot.sink_enabled {
        match cfg.hubspot.token.clone() {
            Some(token) => sinks.push(Arc::new(
                HubSpotSink::new(token, cfg.hubspot.clone()).context("hubspot client")?,
            )),
            None => info!(target: "sink", sink = "hubspot", "HUBSPOT_TOKEN not set, sink disabled"),
        }
    }
    Ok(sinks)
}

pub fn build_service(cfg: &SyncConfig) -> anyhow::Result<Arc<SyncService>> {
    let pipeline = build_pipeline(cfg)?;
    Ok(Arc::new(SyncService::new(pipeline, &cfg.schedule)))
}
