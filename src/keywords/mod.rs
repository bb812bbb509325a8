// src/keywords/mod.rs
pub mod clickup;

use async_trait::async_trait;

use crate::error::{Result, SyncError};
use crate::types::Keyword;

/// Where the keywords of a run come from.
#[async_trait]
pub trait KeywordSource: Send + Sync {
    /// Keywords in provider order. Fails with `SourceUnavailable`.
    async fn fetch_keywords(&self) -> Result<Vec<Keyword>>;
    fn name(&self) -> &'static str;
}

/// Fixed keyword list, e.g. from an ad-hoc request body.
#[derive(Debug, Clone, Default)]
pub struct StaticKeywords {
    keywords: Vec<Keyword>,
}

impl StaticKeywords {
    /// Blank entries are dropped; ids are positional (`manual-0`, `manual-1`, ...).
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = texts
            .into_iter()
            .filter_map(|t| {
                let t = t.as_ref().trim();
                (!t.is_empty()).then(|| t.to_string())
            })
            .enumerate()
            .map(|(i, t)| Keyword::new(format!("manual-{i}"), t))
            .collect();
        Self { keywords }
    }

    pub fn into_keywords(self) -> Vec<Keyword> {
        self.keywords
    }
}

/// Stand-in when no keyword backend is configured; every fetch fails.
#[derive(Debug, Clone)]
pub struct UnconfiguredSource {
    reason: String,
}

impl UnconfiguredSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl KeywordSource for UnconfiguredSource {
    async fn fetch_keywords(&self) -> Result<Vec<Keyword>> {
        Err(SyncError::SourceUnavailable(self.reason.clone()))
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}

#[async_trait]
impl KeywordSource for StaticKeywords {
    async fn fetch_keywords(&self) -> Result<Vec<Keyword>> {
        Ok(self.keywords.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_trims_and_skips_blanks() {
        let src = StaticKeywords::from_texts(["  fintech ", "", "saas"]);
        let kws = src.fetch_keywords().await.unwrap();
        assert_eq!(
            kws,
            vec![Keyword::new("manual-0", "fintech"), Keyword::new("manual-1", "saas")]
        );
    }
}
