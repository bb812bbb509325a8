// src/types.rs
use serde::{Deserialize, Serialize};

/// A search term pulled from the keyword source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    /// Opaque id in the source system (e.g. a ClickUp task id).
    pub id: String,
    pub text: String,
}

impl Keyword {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Where an item was placed by the locale filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleTag {
    /// A location field named the target locale.
    Target,
    /// No location signal was present; kept fail-open.
    Unknown,
}

/// A post returned by the search provider, normalized and locale-checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    /// Natural key for deduplication across sinks.
    pub url: String,
    pub text: String,
    pub author_name: Option<String>,
    pub author_profile_url: Option<String>,
    pub created_at: Option<String>,
    pub location_hint: Option<String>,
    pub location: LocaleTag,
    pub origin_keyword: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<SearchResultItem>,
    /// Raw item count before normalization and filtering.
    pub total_raw: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Created,
    Duplicate,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Created => "created",
            SyncStatus::Duplicate => "duplicate",
            SyncStatus::Failed => "failed",
        }
    }
}

/// Result of writing one item to one sink.
///
/// A keyword whose search failed yields a single outcome with no `item_url`
/// and no `sink_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub keyword: String,
    pub item_url: Option<String>,
    pub sink_id: Option<String>,
    pub status: SyncStatus,
    pub record_id: Option<String>,
    pub error_message: Option<String>,
}

impl SyncOutcome {
    pub fn created(keyword: &str, url: &str, sink: &str, record_id: Option<String>) -> Self {
        Self {
            keyword: keyword.to_string(),
            item_url: Some(url.to_string()),
            sink_id: Some(sink.to_string()),
            status: SyncStatus::Created,
            record_id,
            error_message: None,
        }
    }

    pub fn duplicate(keyword: &str, url: &str, sink: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            item_url: Some(url.to_string()),
            sink_id: Some(sink.to_string()),
            status: SyncStatus::Duplicate,
            record_id: None,
            error_message: None,
        }
    }

    pub fn write_failed(keyword: &str, url: &str, sink: &str, error: String) -> Self {
        Self {
            keyword: keyword.to_string(),
            item_url: Some(url.to_string()),
            sink_id: Some(sink.to_string()),
            status: SyncStatus::Failed,
            record_id: None,
            error_message: Some(error),
        }
    }

    pub fn keyword_failed(keyword: &str, error: String) -> Self {
        Self {
            keyword: keyword.to_string(),
            item_url: None,
            sink_id: None,
            status: SyncStatus::Failed,
            record_id: None,
            error_message: Some(error),
        }
    }
}

/// Aggregate over all outcomes of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub duplicates: usize,
    pub keywords_processed: u32,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[SyncOutcome], keywords_processed: u32) -> Self {
        let count = |s: SyncStatus| outcomes.iter().filter(|o| o.status == s).count();
        Self {
            total: outcomes.len(),
            successful: count(SyncStatus::Created),
            failed: count(SyncStatus::Failed),
            duplicates: count(SyncStatus::Duplicate),
            keywords_processed,
        }
    }
}
