// src/clickup.rs
//! Minimal ClickUp v2 REST client shared by the keyword source and the posts sink.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ClickUpConfig;

/// ClickUp returns at most this many tasks per page.
pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub text_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskPage {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct ListInfo {
    #[serde(default)]
    statuses: Vec<ListStatus>,
}

#[derive(Debug, Deserialize)]
struct ListStatus {
    status: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct ClickUpClient {
    client: Client,
    token: String,
    base_url: String,
}

impl ClickUpClient {
    pub fn new(token: String, cfg: &ClickUpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("keyword-post-sync/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("building clickup http client")?;
        Ok(Self {
            client,
            token,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// One page of open, non-archived tasks ordered by creation date.
    /// `newest_first` flips the order.
    pub async fn list_tasks(
        &self,
        list_id: &str,
        page: u32,
        newest_first: bool,
    ) -> Result<Vec<Task>> {
        let url = format!("{}/list/{}/task", self.base_url, list_id);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", &self.token)
            .query(&[
                ("archived", "false".to_string()),
                ("page", page.to_string()),
                ("order_by", "created".to_string()),
                ("reverse", newest_first.to_string()),
                ("subtasks", "false".to_string()),
                ("include_closed", "false".to_string()),
            ])
            .send()
            .await
            .context("clickup list tasks")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("clickup list tasks: status {status}: {body}"));
        }
        let page: TaskPage = resp.json().await.context("clickup task page json")?;
        Ok(page.tasks)
    }

    /// First status of the list, used as the initial status of new tasks.
    pub async fn first_status(&self, list_id: &str) -> Result<Option<String>> {
        let url = format!("{}/list/{}", self.base_url, list_id);
        let info: ListInfo = self
            .client
            .get(&url)
            .header("Authorization", &self.token)
            .send()
            .await
            .context("clickup get list")?
            .error_for_status()
            .context("clickup get list non-2xx")?
            .json()
            .await
            .context("clickup list json")?;
        Ok(info.statuses.into_iter().next().map(|s| s.status))
    }

    pub async fn create_task(&self, list_id: &str, task: &NewTask) -> Result<Task> {
        let url = format!("{}/list/{}/task", self.base_url, list_id);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", &self.token)
            .json(task)
            .send()
            .await
            .context("clickup create task")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("clickup create task: status {status}: {body}"));
        }
        resp.json().await.context("clickup created task json")
    }
}
