// src/keywords/clickup.rs
use async_trait::async_trait;

use super::KeywordSource;
use crate::clickup::{ClickUpClient, Task, PAGE_SIZE};
use crate::error::{Result, SyncError};
use crate::types::Keyword;

/// Keywords are the names of the open tasks in a ClickUp list.
pub struct ClickUpKeywordSource {
    client: ClickUpClient,
    list_id: String,
    /// Safety stop for runaway pagination.
    max_pages: u32,
}

impl ClickUpKeywordSource {
    pub fn new(client: ClickUpClient, list_id: impl Into<String>) -> Self {
        Self {
            client,
            list_id: list_id.into(),
            max_pages: 50,
        }
    }
}

/// Task → keyword; blank names are skipped.
pub fn keyword_from_task(task: &Task) -> Option<Keyword> {
    let text = task.name.trim();
    (!text.is_empty()).then(|| Keyword::new(task.id.clone(), text))
}

#[async_trait]
impl KeywordSource for ClickUpKeywordSource {
    async fn fetch_keywords(&self) -> Result<Vec<Keyword>> {
        tracing::info!(target: "sync", list_id = %self.list_id, "fetching keywords from clickup");
        let mut keywords = Vec::new();
        for page in 0..self.max_pages {
            let tasks = self
                .client
                .list_tasks(&self.list_id, page, false)
                .await
                .map_err(|e| SyncError::SourceUnavailable(format!("{e:#}")))?;
            keywords.extend(tasks.iter().filter_map(keyword_from_task));
            if tasks.len() < PAGE_SIZE {
                break;
            }
        }
        tracing::info!(target: "sync", count = keywords.len(), "keywords fetched");
        Ok(keywords)
    }

    fn name(&self) -> &'static str {
        "clickup"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_task_names_are_skipped() {
        let t = |id: &str, name: &str| Task {
            id: id.into(),
            name: name.into(),
            description: None,
            text_content: None,
        };
        assert_eq!(
            keyword_from_task(&t("1", "  growth hacking ")),
            Some(Keyword::new("1", "growth hacking"))
        );
        assert_eq!(keyword_from_task(&t("2", "   ")), None);
    }
}
