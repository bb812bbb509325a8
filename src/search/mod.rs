// src/search/mod.rs
pub mod apify;
pub mod fields;
pub mod locale;

use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;

use crate::error::{Result, SyncError};
use crate::types::{LocaleTag, SearchResult, SearchResultItem};
pub use locale::{LocaleDecision, LocaleFilter};

/// Content-search provider. One call per keyword batch; no internal retries.
#[async_trait]
pub trait ContentSearch: Send + Sync {
    /// `keywords` must be non-empty. Zero results is `Ok` with no items.
    async fn search(&self, keywords: &[String]) -> Result<SearchResult>;
    fn name(&self) -> &'static str;
}

/// Stand-in when no search provider is configured; every search fails.
#[derive(Debug, Clone)]
pub struct UnconfiguredSearch {
    reason: String,
}

impl UnconfiguredSearch {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ContentSearch for UnconfiguredSearch {
    async fn search(&self, _keywords: &[String]) -> Result<SearchResult> {
        Err(SyncError::SearchFailed(self.reason.clone()))
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}

/// Normalize raw provider items and apply the locale filter.
///
/// Items without a URL are skipped silently; items whose location names
/// another place are dropped. Provider order is preserved.
pub fn normalize_items(raw: &[Value], keywords: &[String], filter: &LocaleFilter) -> SearchResult {
    let fallback_keyword = keywords.first().cloned().unwrap_or_default();
    let mut items = Vec::with_capacity(raw.len());
    let mut missing_url = 0usize;
    let mut dropped = 0usize;
    let mut confirmed = 0usize;

    for it in raw {
        let Some(url) = fields::first_text(it, fields::URL_FIELDS) else {
            missing_url += 1;
            continue;
        };

        let location_hint = fields::location(it);
        let location = match filter.decide(location_hint.as_deref()) {
            LocaleDecision::NonMatch => {
                dropped += 1;
                tracing::debug!(
                    target: "search",
                    %url,
                    location = ?location_hint,
                    "dropped by locale filter"
                );
                continue;
            }
            LocaleDecision::Match => {
                confirmed += 1;
                LocaleTag::Target
            }
            LocaleDecision::Unknown => LocaleTag::Unknown,
        };

        let (author_name, author_profile_url) = fields::author(it);
        items.push(SearchResultItem {
            url,
            text: fields::first_text(it, fields::TEXT_FIELDS).unwrap_or_default(),
            author_name,
            author_profile_url,
            created_at: fields::first_text(it, fields::CREATED_AT_FIELDS),
            location_hint,
            location,
            origin_keyword: fields::first_text(it, fields::KEYWORD_FIELDS)
                .unwrap_or_else(|| fallback_keyword.clone()),
        });
    }

    counter!("search_raw_items_total").increment(raw.len() as u64);
    counter!("search_missing_url_total").increment(missing_url as u64);
    counter!("search_locale_dropped_total").increment(dropped as u64);
    tracing::info!(
        target: "search",
        raw = raw.len(),
        kept = items.len(),
        confirmed_locale = confirmed,
        dropped_locale = dropped,
        missing_url,
        locale = %filter.label,
        "search results normalized"
    );

    SearchResult {
        items,
        total_raw: raw.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_order_drops_foreign_and_urlless() {
        let raw = vec![
            json!({ "url": "https://p/1", "text": "hola", "author": { "name": "A", "location": "Monterrey, Mexico" } }),
            json!({ "text": "no url" }),
            json!({ "postUrl": "https://p/2", "author": { "location": "Madrid, Spain" } }),
            json!({ "linkedinUrl": "https://p/3", "author": "B", "searchQuery": "fintech" }),
        ];
        let kws = vec!["saas".to_string()];
        let out = normalize_items(&raw, &kws, &LocaleFilter::default());
        assert_eq!(out.total_raw, 4);
        let urls: Vec<_> = out.items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://p/1", "https://p/3"]);
        assert_eq!(out.items[0].location, LocaleTag::Target);
        assert_eq!(out.items[0].origin_keyword, "saas");
        assert_eq!(out.items[1].location, LocaleTag::Unknown);
        assert_eq!(out.items[1].origin_keyword, "fintech");
        assert_eq!(out.items[1].author_name.as_deref(), Some("B"));
    }

    #[test]
    fn empty_input_is_empty_result() {
        let out = normalize_items(&[], &["x".to_string()], &LocaleFilter::default());
        assert!(out.items.is_empty());
        assert_eq!(out.total_raw, 0);
    }
}
