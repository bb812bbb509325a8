// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Error taxonomy of a sync run.
///
/// Only `SourceUnavailable` and `PersistenceFailed` abort a run. `SearchFailed`
/// and `WriteFailed` are caught by the pipeline and turned into outcomes.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Daily limit reached")]
    QuotaExceeded,

    #[error("keyword source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("search failed: {0}")]
    SearchFailed(String),

    #[error("write to {sink} failed: {message}")]
    WriteFailed { sink: String, message: String },

    #[error("quota persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("a sync run is already in progress")]
    AlreadyRunning,

    #[error("sync run aborted: {0}")]
    RunAborted(String),
}

impl SyncError {
    pub fn write_failed(sink: &str, message: impl Into<String>) -> Self {
        SyncError::WriteFailed {
            sink: sink.to_string(),
            message: message.into(),
        }
    }

    /// True for errors that must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::SourceUnavailable(_) | SyncError::PersistenceFailed(_)
        )
    }
}

/// Render a non-2xx response as `status N: body` for error messages.
pub(crate) async fn http_error_detail(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    format!("status {}: {}", status.as_u16(), body)
}
