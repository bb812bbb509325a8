// src/sinks/clickup.rs
use async_trait::async_trait;

use super::record::{BodyStyle, RecordBody};
use super::{contains_key, RecordSink};
use crate::clickup::{ClickUpClient, NewTask};
use crate::error::{Result, SyncError};
use crate::types::{Keyword, SearchResultItem};

const MAX_CONTENT_CHARS: usize = 500;
const PRIORITY_NORMAL: u8 = 3;

/// Posts become tasks in a ClickUp list.
pub struct ClickUpSink {
    client: ClickUpClient,
    list_id: String,
}

impl ClickUpSink {
    pub fn new(client: ClickUpClient, list_id: impl Into<String>) -> Self {
        Self {
            client,
            list_id: list_id.into(),
        }
    }

    pub fn build_task(
        item: &SearchResultItem,
        keyword: &Keyword,
        status: Option<String>,
    ) -> NewTask {
        let body = RecordBody::new(item, keyword, MAX_CONTENT_CHARS);
        NewTask {
            name: body.title(),
            description: body.render(BodyStyle::Markdown),
            priority: PRIORITY_NORMAL,
            status,
        }
    }
}

#[async_trait]
impl RecordSink for ClickUpSink {
    fn id(&self) -> &'static str {
        "clickup"
    }

    /// Scans the newest page of the posts list.
    async fn find_existing(&self, natural_key: &str) -> Result<bool> {
        let tasks = self
            .client
            .list_tasks(&self.list_id, 0, true)
            .await
            .map_err(|e| SyncError::write_failed(self.id(), format!("{e:#}")))?;
        let found = tasks.iter().any(|t| {
            contains_key(
                [t.description.as_deref(), t.text_content.as_deref()]
                    .into_iter()
                    .flatten(),
                natural_key,
            )
        });
        if found {
            tracing::debug!(target: "sink", sink = "clickup", key = natural_key, "existing task found");
        }
        Ok(found)
    }

    async fn create_record(&self, item: &SearchResultItem, keyword: &Keyword) -> Result<String> {
        let status = match self.client.first_status(&self.list_id).await {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(target: "sink", error = %e, "list statuses unavailable, creating without status");
                None
            }
        };
        let task = Self::build_task(item, keyword, status);
        let created = self
            .client
            .create_task(&self.list_id, &task)
            .await
            .map_err(|e| SyncError::write_failed(self.id(), format!("{e:#}")))?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocaleTag;

    #[test]
    fn task_carries_title_body_and_priority() {
        let item = SearchResultItem {
            url: "https://in/p/1".into(),
            text: "hola".into(),
            author_name: None,
            author_profile_url: Some("https://in/u/ana".into()),
            created_at: None,
            location_hint: None,
            location: LocaleTag::Unknown,
            origin_keyword: "saas".into(),
        };
        let t = ClickUpSink::build_task(&item, &Keyword::new("k", "saas"), Some("to do".into()));
        assert_eq!(t.name, "Not available - LinkedIn post (saas)");
        assert!(t.description.contains("**Post URL:** https://in/p/1"));
        assert!(t.description.contains("**Profile URL:** https://in/u/ana"));
        assert_eq!(t.priority, 3);
        assert_eq!(t.status.as_deref(), Some("to do"));
    }
}
