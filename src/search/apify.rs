// src/search/apify.rs
//! Apify actor adapter: start a run, long-poll it, read the dataset.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{normalize_items, ContentSearch, LocaleFilter};
use crate::config::ApifyConfig;
use crate::error::{http_error_detail, Result, SyncError};
use crate::types::SearchResult;

/// Input document of the LinkedIn post-search actor.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostSearchInput {
    pub search_queries: Vec<String>,
    pub max_posts: u32,
    pub profile_scraper_mode: String,
    pub start_page: u32,
    pub scrape_reactions: bool,
    pub max_reactions: u32,
    pub scrape_comments: bool,
    pub include_reposts: bool,
    #[serde(rename = "author_location")]
    pub author_location: String,
}

impl PostSearchInput {
    pub fn from_config(cfg: &ApifyConfig, keywords: &[String]) -> Self {
        Self {
            search_queries: keywords.to_vec(),
            max_posts: cfg.max_posts_per_keyword,
            profile_scraper_mode: cfg.profile_scraper_mode.clone(),
            start_page: cfg.start_page,
            scrape_reactions: cfg.scrape_reactions,
            max_reactions: cfg.max_reactions,
            scrape_comments: cfg.scrape_comments,
            include_reposts: cfg.include_reposts,
            author_location: cfg.author_location.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunData {
    id: String,
    status: String,
    default_dataset_id: String,
}

pub struct ApifySearch {
    client: Client,
    token: String,
    cfg: ApifyConfig,
    filter: LocaleFilter,
}

impl ApifySearch {
    pub fn new(token: String, cfg: ApifyConfig, filter: LocaleFilter) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("keyword-post-sync/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            // long-poll requests hold for up to 60s server-side
            .timeout(Duration::from_secs(cfg.request_timeout_secs.max(65)))
            .build()?;
        Ok(Self {
            client,
            token,
            cfg,
            filter,
        })
    }

    fn base(&self) -> &str {
        self.cfg.base_url.trim_end_matches('/')
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SyncError::SearchFailed(format!("apify request: {e}")))?;
        if !resp.status().is_success() {
            return Err(SyncError::SearchFailed(format!(
                "apify {}",
                http_error_detail(resp).await
            )));
        }
        resp.json()
            .await
            .map_err(|e| SyncError::SearchFailed(format!("apify response: {e}")))
    }

    async fn start_run(&self, input: &PostSearchInput) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base(), self.cfg.actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await
            .map_err(|e| SyncError::SearchFailed(format!("apify start run: {e}")))?;
        if !resp.status().is_success() {
            return Err(SyncError::SearchFailed(format!(
                "apify start run {}",
                http_error_detail(resp).await
            )));
        }
        let body: ApiResponse<RunData> = resp
            .json()
            .await
            .map_err(|e| SyncError::SearchFailed(format!("apify run response: {e}")))?;
        Ok(body.data)
    }

    async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        for _ in 0..self.cfg.max_poll_rounds.max(1) {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base(), run_id);
            let run: ApiResponse<RunData> = self.get_json(&url).await?;
            match run.data.status.as_str() {
                "SUCCEEDED" => return Ok(run.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(SyncError::SearchFailed(format!(
                        "apify run {run_id} ended with status {}",
                        run.data.status
                    )));
                }
                _ => {
                    tracing::debug!(target: "search", run_id, status = %run.data.status, "run still in progress");
                }
            }
        }
        Err(SyncError::SearchFailed(format!(
            "apify run {run_id} did not finish after {} polls",
            self.cfg.max_poll_rounds
        )))
    }
}

#[async_trait]
impl ContentSearch for ApifySearch {
    async fn search(&self, keywords: &[String]) -> Result<SearchResult> {
        if keywords.is_empty() {
            return Err(SyncError::SearchFailed("no keywords given".into()));
        }
        let input = PostSearchInput::from_config(&self.cfg, keywords);
        tracing::info!(
            target: "search",
            actor = %self.cfg.actor_id,
            keywords = keywords.len(),
            queries = ?keywords,
            "starting apify actor run"
        );

        let run = self.start_run(&input).await?;
        tracing::info!(target: "search", run_id = %run.id, "apify run started, polling for completion");
        let done = self.wait_for_run(&run.id).await?;

        let url = format!(
            "{}/datasets/{}/items?format=json&clean=true",
            self.base(),
            done.default_dataset_id
        );
        let raw: Vec<Value> = self.get_json(&url).await?;
        tracing::info!(target: "search", run_id = %done.id, items = raw.len(), "dataset fetched");

        Ok(normalize_items(&raw, keywords, &self.filter))
    }

    fn name(&self) -> &'static str {
        "apify"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_uses_actor_field_names() {
        let cfg = ApifyConfig::default();
        let input = PostSearchInput::from_config(&cfg, &["b2b sales".to_string()]);
        let v = serde_json::to_value(&input).unwrap();
        assert_eq!(v["searchQueries"][0], "b2b sales");
        assert_eq!(v["maxPosts"], 20);
        assert_eq!(v["profileScraperMode"], "short");
        assert_eq!(v["includeReposts"], false);
        assert_eq!(v["author_location"], "Mexico");
    }
}
