// src/pipeline/mod.rs
//! One sync run: quota check, keyword fetch, per-keyword search, per-item
//! writes to every sink, then a single quota advance.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SyncError};
use crate::keywords::KeywordSource;
use crate::quota::{QuotaStats, QuotaTracker};
use crate::search::ContentSearch;
use crate::sinks::RecordSink;
use crate::types::{Keyword, RunSummary, SearchResultItem, SyncOutcome};

pub const NO_KEYWORDS: &str = "No keywords found";

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("sync_runs_total", "Sync runs started.");
        describe_counter!(
            "sync_keywords_processed_total",
            "Keywords searched (successfully or not)."
        );
        describe_counter!("sync_outcomes_total", "Per-sink outcomes by status.");
        describe_counter!("search_raw_items_total", "Raw items returned by the search provider.");
        describe_counter!(
            "search_locale_dropped_total",
            "Items dropped because their location named another place."
        );
        describe_counter!("search_missing_url_total", "Raw items skipped for lack of a URL.");
        describe_counter!(
            "sink_duplicate_check_errors_total",
            "Duplicate lookups that failed and were treated as not-duplicate."
        );
        describe_gauge!("quota_remaining", "Keywords left in today's quota window.");
        describe_gauge!("quota_daily_limit", "Configured keywords per day.");
        describe_gauge!("sync_last_run_ts", "Unix ts of the last completed sync run.");
    });
}

/// What a run reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    #[serde(default)]
    pub outcomes: Vec<SyncOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<QuotaStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    fn rejected(error: impl Into<String>, stats: QuotaStats) -> Self {
        Self {
            success: false,
            summary: None,
            outcomes: Vec::new(),
            stats: Some(stats),
            error: Some(error.into()),
        }
    }

    /// True when the run did nothing because today's quota was used up.
    pub fn is_limit_reached(&self) -> bool {
        let limit_msg = SyncError::QuotaExceeded.to_string();
        !self.success && self.error.as_deref() == Some(limit_msg.as_str())
    }
}

pub struct Pipeline {
    quota: QuotaTracker,
    keywords: Arc<dyn KeywordSource>,
    search: Arc<dyn ContentSearch>,
    sinks: Vec<Arc<dyn RecordSink>>,
    keyword_delay: Duration,
}

impl Pipeline {
    pub fn new(
        quota: QuotaTracker,
        keywords: Arc<dyn KeywordSource>,
        search: Arc<dyn ContentSearch>,
    ) -> Self {
        Self {
            quota,
            keywords,
            search,
            sinks: Vec::new(),
            keyword_delay: Duration::ZERO,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Pause between consecutive keyword searches (not after the last one).
    pub fn with_keyword_delay(mut self, delay: Duration) -> Self {
        self.keyword_delay = delay;
        self
    }

    pub fn sink_ids(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.id()).collect()
    }

    pub async fn stats(&self) -> Result<QuotaStats> {
        self.quota.stats().await
    }

    /// Full run with keywords from the configured source.
    ///
    /// Only `SourceUnavailable` and `PersistenceFailed` come back as `Err`;
    /// a used-up quota or an empty keyword list is an unsuccessful `RunResult`.
    pub async fn run_once(&self) -> Result<RunResult> {
        self.run(None).await
    }

    /// Same flow with caller-provided keywords instead of the source.
    pub async fn run_with_keywords(&self, keywords: Vec<Keyword>) -> Result<RunResult> {
        self.run(Some(keywords)).await
    }

    async fn run(&self, provided: Option<Vec<Keyword>>) -> Result<RunResult> {
        ensure_metrics_described();
        counter!("sync_runs_total").increment(1);

        let stats = self.quota.stats().await?;
        if stats.remaining == 0 {
            info!(target: "sync", count = stats.count, limit = stats.limit, "daily limit reached, skipping run");
            return Ok(RunResult::rejected(SyncError::QuotaExceeded.to_string(), stats));
        }

        let mut keywords = match provided {
            Some(k) => k,
            None => self.keywords.fetch_keywords().await?,
        };
        if keywords.is_empty() {
            info!(target: "sync", source = self.keywords.name(), "no keywords to process");
            return Ok(RunResult::rejected(NO_KEYWORDS, stats));
        }
        let available = keywords.len();
        keywords.truncate(stats.remaining as usize);
        info!(
            target: "sync",
            available,
            selected = keywords.len(),
            remaining = stats.remaining,
            sinks = ?self.sink_ids(),
            "starting sync run"
        );

        let mut outcomes = Vec::new();
        let mut processed: u32 = 0;
        for (idx, keyword) in keywords.iter().enumerate() {
            self.process_keyword(keyword, &mut outcomes).await;
            processed += 1;

            if idx + 1 < keywords.len() && !self.keyword_delay.is_zero() {
                tokio::time::sleep(self.keyword_delay).await;
            }
        }

        let stats = self.quota.increment(processed).await?;
        counter!("sync_keywords_processed_total").increment(u64::from(processed));
        for o in &outcomes {
            counter!("sync_outcomes_total", "status" => o.status.as_str()).increment(1);
        }
        gauge!("sync_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        let summary = RunSummary::from_outcomes(&outcomes, processed);
        info!(
            target: "sync",
            total = summary.total,
            created = summary.successful,
            duplicates = summary.duplicates,
            failed = summary.failed,
            keywords = summary.keywords_processed,
            "sync run finished"
        );
        Ok(RunResult {
            success: true,
            summary: Some(summary),
            outcomes,
            stats: Some(stats),
            error: None,
        })
    }

    async fn process_keyword(&self, keyword: &Keyword, outcomes: &mut Vec<SyncOutcome>) {
        let query = [keyword.text.clone()];
        let result = match self.search.search(&query).await {
            Ok(r) => r,
            Err(e) => {
                warn!(target: "sync", keyword = %keyword.text, provider = self.search.name(), error = %e, "search failed");
                outcomes.push(SyncOutcome::keyword_failed(&keyword.text, e.to_string()));
                return;
            }
        };
        info!(
            target: "sync",
            keyword = %keyword.text,
            raw = result.total_raw,
            kept = result.items.len(),
            "search done"
        );
        for item in &result.items {
            for sink in &self.sinks {
                outcomes.push(self.write(sink.as_ref(), item, keyword).await);
            }
        }
    }

    async fn write(
        &self,
        sink: &dyn RecordSink,
        item: &SearchResultItem,
        keyword: &Keyword,
    ) -> SyncOutcome {
        match sink.create(item, keyword).await {
            Ok(c) if c.duplicate => SyncOutcome::duplicate(&keyword.text, &item.url, sink.id()),
            Ok(c) => SyncOutcome::created(&keyword.text, &item.url, sink.id(), c.record_id),
            Err(e) => {
                warn!(target: "sync", sink = sink.id(), url = %item.url, error = %e, "sink write failed");
                SyncOutcome::write_failed(&keyword.text, &item.url, sink.id(), e.to_string())
            }
        }
    }
}
