// src/sinks/mod.rs
//! Record sinks: external systems that receive one record per new post.
//!
//! Duplicate detection is best-effort. Sinks scan a bounded page of recent
//! records for the post URL as a literal substring, so an old record outside
//! that page can be missed, but a record that does not contain the full URL
//! never counts as a duplicate.

pub mod clickup;
pub mod hubspot;
pub mod record;

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;

use crate::error::Result;
use crate::types::{Keyword, SearchResultItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutcome {
    pub record_id: Option<String>,
    pub duplicate: bool,
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Stable id used in outcomes and logs.
    fn id(&self) -> &'static str;

    /// Raw duplicate lookup. Errors are absorbed by [`RecordSink::check_duplicate`].
    async fn find_existing(&self, natural_key: &str) -> Result<bool>;

    /// Write a new record and return its id. Fails with `WriteFailed`.
    async fn create_record(&self, item: &SearchResultItem, keyword: &Keyword) -> Result<String>;

    /// Duplicate check that never fails outward: lookup errors mean "not a duplicate".
    async fn check_duplicate(&self, natural_key: &str) -> bool {
        if natural_key.trim().is_empty() {
            return false;
        }
        match self.find_existing(natural_key).await {
            Ok(found) => found,
            Err(e) => {
                counter!("sink_duplicate_check_errors_total", "sink" => self.id()).increment(1);
                tracing::warn!(target: "sink", sink = self.id(), error = %e, "duplicate check failed, continuing");
                false
            }
        }
    }

    /// Duplicate check, then create. A duplicate writes nothing.
    async fn create(&self, item: &SearchResultItem, keyword: &Keyword) -> Result<CreateOutcome> {
        if self.check_duplicate(&item.url).await {
            tracing::info!(target: "sink", sink = self.id(), url = %item.url, "duplicate post, skipped");
            return Ok(CreateOutcome {
                record_id: None,
                duplicate: true,
            });
        }
        let id = self.create_record(item, keyword).await?;
        tracing::info!(target: "sink", sink = self.id(), url = %item.url, record_id = %id, "record created");
        Ok(CreateOutcome {
            record_id: Some(id),
            duplicate: false,
        })
    }
}

/// Literal containment of the full key in any of the texts.
pub fn contains_key<'a, I>(texts: I, natural_key: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    !natural_key.is_empty() && texts.into_iter().any(|t| t.contains(natural_key))
}
