// src/sinks/hubspot.rs
//! HubSpot CRM sink: one deal per post.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::record::{BodyStyle, RecordBody};
use super::{contains_key, RecordSink};
use crate::config::HubSpotConfig;
use crate::error::{http_error_detail, Result, SyncError};
use crate::types::{Keyword, SearchResultItem};

const MAX_CONTENT_CHARS: usize = 1_000;
const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DealHit>,
}

#[derive(Debug, Deserialize)]
struct DealHit {
    id: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Pipelines {
    #[serde(default)]
    results: Vec<Pipeline>,
}

#[derive(Debug, Deserialize)]
struct Pipeline {
    id: String,
    #[serde(default)]
    stages: Vec<Stage>,
}

#[derive(Debug, Deserialize)]
struct Stage {
    id: String,
}

/// Where new deals land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealPlacement {
    pub pipeline: Option<String>,
    pub stage: Option<String>,
}

fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

pub struct HubSpotSink {
    client: Client,
    token: String,
    cfg: HubSpotConfig,
}

impl HubSpotSink {
    pub fn new(token: String, cfg: HubSpotConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("keyword-post-sync/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("building hubspot http client")?;
        Ok(Self { client, token, cfg })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.cfg.base_url.trim_end_matches('/'), path)
    }

    /// Deal properties for a post. Placement is filled in separately.
    pub fn deal_properties(
        cfg: &HubSpotConfig,
        item: &SearchResultItem,
        keyword: &Keyword,
    ) -> Map<String, Value> {
        let body = RecordBody::new(item, keyword, MAX_CONTENT_CHARS);
        let mut props = Map::new();
        props.insert(
            "dealname".into(),
            json!(format!("Post Keywords: {}", body.title())),
        );
        props.insert("description".into(), json!(body.render(BodyStyle::Plain)));
        props.insert("amount".into(), json!("0"));
        props.insert("deal_currency_code".into(), json!(cfg.currency));
        if let Some(prop) = cfg.profile_url_property.as_deref().filter(|p| !p.is_empty()) {
            props.insert(prop.to_string(), json!(body.profile_url));
        }
        props
    }

    /// Numeric configured stage wins; otherwise ask the pipelines API for the
    /// first stage of the configured (or first) pipeline.
    async fn placement(&self) -> DealPlacement {
        let pipeline_id = self.cfg.pipeline_id.trim();
        let stage_id = self.cfg.deal_stage_id.trim();
        if is_numeric_id(stage_id) {
            return DealPlacement {
                pipeline: Some(pipeline_id.to_string()).filter(|p| !p.is_empty()),
                stage: Some(stage_id.to_string()),
            };
        }
        match self.first_stage(pipeline_id).await {
            Ok(Some(p)) => p,
            other => {
                if let Err(e) = other {
                    tracing::debug!(target: "sink", sink = "hubspot", error = %e, "pipeline lookup failed");
                }
                tracing::warn!(target: "sink", sink = "hubspot", "no valid pipeline/stage, creating deal without placement");
                DealPlacement {
                    pipeline: Some(pipeline_id.to_string()).filter(|p| is_numeric_id(p)),
                    stage: None,
                }
            }
        }
    }

    async fn first_stage(&self, pipeline_id: &str) -> anyhow::Result<Option<DealPlacement>> {
        let pipelines: Pipelines = self
            .client
            .get(self.url("/crm/v3/pipelines/deals"))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("hubspot pipelines")?
            .error_for_status()
            .context("hubspot pipelines non-2xx")?
            .json()
            .await
            .context("hubspot pipelines json")?;
        Ok(select_first_stage(pipelines.results, pipeline_id))
    }
}

fn select_first_stage(pipelines: Vec<Pipeline>, pipeline_id: &str) -> Option<DealPlacement> {
    let idx = pipelines
        .iter()
        .position(|p| p.id == pipeline_id)
        .unwrap_or(0);
    let p = pipelines.into_iter().nth(idx)?;
    let stage = p.stages.into_iter().next()?;
    Some(DealPlacement {
        pipeline: Some(p.id),
        stage: Some(stage.id),
    })
}

#[async_trait]
impl RecordSink for HubSpotSink {
    fn id(&self) -> &'static str {
        "hubspot"
    }

    /// Token search on the description, then a literal containment check.
    async fn find_existing(&self, natural_key: &str) -> Result<bool> {
        let query = json!({
            "filterGroups": [{
                "filters": [{
                    "propertyName": "description",
                    "operator": "CONTAINS_TOKEN",
                    "value": natural_key,
                }]
            }],
            "limit": SEARCH_LIMIT,
            "properties": ["dealname", "description"],
        });
        let resp = self
            .client
            .post(self.url("/crm/v3/objects/deals/search"))
            .bearer_auth(&self.token)
            .json(&query)
            .send()
            .await
            .map_err(|e| SyncError::write_failed(self.id(), format!("deal search: {e}")))?;
        if !resp.status().is_success() {
            return Err(SyncError::write_failed(
                self.id(),
                format!("deal search {}", http_error_detail(resp).await),
            ));
        }
        let found: SearchResponse = resp
            .json()
            .await
            .map_err(|e| SyncError::write_failed(self.id(), format!("deal search json: {e}")))?;
        let hit = found.results.iter().find(|d| {
            contains_key(
                d.properties.get("description").and_then(Value::as_str),
                natural_key,
            )
        });
        if let Some(d) = hit {
            tracing::debug!(target: "sink", sink = "hubspot", deal_id = %d.id, "existing deal found");
        }
        Ok(hit.is_some())
    }

    async fn create_record(&self, item: &SearchResultItem, keyword: &Keyword) -> Result<String> {
        let mut props = Self::deal_properties(&self.cfg, item, keyword);
        let placement = self.placement().await;
        if let Some(p) = placement.pipeline {
            props.insert("pipeline".into(), json!(p));
        }
        if let Some(s) = placement.stage {
            props.insert("dealstage".into(), json!(s));
        }

        let resp = self
            .client
            .post(self.url("/crm/v3/objects/deals"))
            .bearer_auth(&self.token)
            .json(&json!({ "properties": props }))
            .send()
            .await
            .map_err(|e| SyncError::write_failed(self.id(), format!("create deal: {e}")))?;
        if !resp.status().is_success() {
            return Err(SyncError::write_failed(
                self.id(),
                format!("create deal {}", http_error_detail(resp).await),
            ));
        }
        let created: Created = resp
            .json()
            .await
            .map_err(|e| SyncError::write_failed(self.id(), format!("create deal json: {e}")))?;
        Ok(created.id)
    }
}
