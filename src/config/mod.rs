// src/config/mod.rs
//! Runtime configuration.
//!
//! Lookup order for the file:
//! 1) `$SYNC_CONFIG_PATH`
//! 2) `config/sync.toml`
//! 3) `config/sync.json`
//! 4) built-in defaults
//!
//! Tokens and the usual deployment knobs can then be overridden from the
//! environment (see [`SyncConfig::apply_env_from`]).

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::search::LocaleFilter;

pub const ENV_CONFIG_PATH: &str = "SYNC_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/sync.toml";
pub const DEFAULT_JSON_PATH: &str = "config/sync.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub quota: QuotaConfig,
    pub pacing: PacingConfig,
    pub locale: LocaleConfig,
    pub apify: ApifyConfig,
    pub clickup: ClickUpConfig,
    pub hubspot: HubSpotConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Keywords that may be searched per calendar day.
    pub daily_limit: u32,
    pub state_path: PathBuf,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: 10,
            state_path: PathBuf::from("state/quota.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause between keywords, not between items.
    pub keyword_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            keyword_delay_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub label: String,
    pub tokens: Vec<String>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        let f = LocaleFilter::default();
        Self {
            label: f.label,
            tokens: f.tokens,
        }
    }
}

impl LocaleConfig {
    pub fn filter(&self) -> LocaleFilter {
        LocaleFilter::new(self.label.clone(), self.tokens.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApifyConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub actor_id: String,
    pub max_posts_per_keyword: u32,
    pub profile_scraper_mode: String,
    pub start_page: u32,
    pub scrape_reactions: bool,
    pub max_reactions: u32,
    pub scrape_comments: bool,
    pub include_reposts: bool,
    pub author_location: String,
    pub request_timeout_secs: u64,
    /// Long-poll rounds (60s each) before a run is given up on.
    pub max_poll_rounds: u32,
}

impl Default for ApifyConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: "https://api.apify.com/v2".into(),
            actor_id: "buIWk2uOUzTmcLsuB".into(),
            max_posts_per_keyword: 20,
            profile_scraper_mode: "short".into(),
            start_page: 1,
            scrape_reactions: false,
            max_reactions: 5,
            scrape_comments: false,
            include_reposts: false,
            author_location: "Mexico".into(),
            request_timeout_secs: 90,
            max_poll_rounds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClickUpConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub keywords_list_id: String,
    pub posts_list_id: String,
    /// Write posts into the posts list.
    pub sink_enabled: bool,
    pub request_timeout_secs: u64,
}

impl Default for ClickUpConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: "https://api.clickup.com/api/v2".into(),
            keywords_list_id: "901708915302".into(),
            posts_list_id: "901708915350".into(),
            sink_enabled: true,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubSpotConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub sink_enabled: bool,
    pub pipeline_id: String,
    /// Numeric stage ids are used as is; anything else triggers a lookup.
    pub deal_stage_id: String,
    pub currency: String,
    /// Custom deal property that receives the author's profile URL.
    pub profile_url_property: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: "https://api.hubapi.com".into(),
            sink_enabled: true,
            pipeline_id: "654720623".into(),
            deal_stage_id: "1169433784".into(),
            currency: "MXN".into(),
            profile_url_property: Some("link_original_de_la_noticia".into()),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 24 * 3600,
        }
    }
}

impl SyncConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sync config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: SyncConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?,
            _ => toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?,
        };
        Ok(cfg.sanitized())
    }

    /// File lookup (env path, then fallbacks), without env overrides.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for p in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default().sanitized())
    }

    /// File lookup plus process environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::load_default()?;
        cfg.apply_env_from(|k| std::env::var(k).ok());
        Ok(cfg.sanitized())
    }

    /// Apply overrides from a variable lookup. Unparsable numbers are ignored.
    pub fn apply_env_from<F: Fn(&str) -> Option<String>>(&mut self, get: F) {
        let text = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let num = |k: &str| text(k).and_then(|v| v.parse::<u64>().ok());
        let flag = |k: &str| {
            text(k).map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        };

        if let Some(v) = text("CLICKUP_API_TOKEN") {
            self.clickup.token = Some(v);
        }
        if let Some(v) = text("CLICKUP_KEYWORDS_LIST_ID") {
            self.clickup.keywords_list_id = v;
        }
        if let Some(v) = text("CLICKUP_POSTS_LIST_ID") {
            self.clickup.posts_list_id = v;
        }

        if let Some(v) = text("APIFY_API_TOKEN") {
            self.apify.token = Some(v);
        }
        if let Some(v) = text("APIFY_ACTOR_ID") {
            self.apify.actor_id = v;
        }
        if let Some(v) = num("MAX_POSTS_PER_KEYWORD") {
            self.apify.max_posts_per_keyword = v as u32;
        }
        if let Some(v) = text("PROFILE_SCRAPER_MODE") {
            self.apify.profile_scraper_mode = v;
        }
        if let Some(v) = num("START_PAGE") {
            self.apify.start_page = v as u32;
        }
        if let Some(v) = flag("SCRAPE_REACTIONS") {
            self.apify.scrape_reactions = v;
        }
        if let Some(v) = num("MAX_REACTIONS") {
            self.apify.max_reactions = v as u32;
        }
        if let Some(v) = flag("SCRAPE_COMMENTS") {
            self.apify.scrape_comments = v;
        }
        if let Some(v) = flag("INCLUDE_REPOSTS") {
            self.apify.include_reposts = v;
        }
        if let Some(v) = text("AUTHOR_LOCATION") {
            self.apify.author_location = v;
        }

        if let Some(v) = text("HUBSPOT_TOKEN") {
            self.hubspot.token = Some(v);
        }
        if let Some(v) = text("HUBSPOT_PIPELINE_ID") {
            self.hubspot.pipeline_id = v;
        }
        if let Some(v) = text("HUBSPOT_DEAL_STAGE_ID") {
            self.hubspot.deal_stage_id = v;
        }

        if let Some(v) = num("DAILY_KEYWORD_LIMIT") {
            self.quota.daily_limit = v.min(u32::MAX as u64) as u32;
        }
        if let Some(v) = text("QUOTA_STATE_PATH") {
            self.quota.state_path = PathBuf::from(v);
        }
        if let Some(v) = num("KEYWORD_DELAY_MS") {
            self.pacing.keyword_delay_ms = v;
        }
        if let Some(v) = num("SCHEDULE_INTERVAL_SECS") {
            self.schedule.interval_secs = v;
        }
        if let Some(v) = flag("SCHEDULE_ENABLED") {
            self.schedule.enabled = v;
        }
    }

    /// Clamp values into workable ranges.
    pub fn sanitized(mut self) -> Self {
        self.quota.daily_limit = self.quota.daily_limit.max(1);
        self.schedule.interval_secs = self.schedule.interval_secs.max(60);
        let f = self.locale.filter();
        self.locale.label = f.label;
        self.locale.tokens = f.tokens;
        for tok in [
            &mut self.clickup.token,
            &mut self.apify.token,
            &mut self.hubspot.token,
        ] {
            if tok.as_deref().is_some_and(|t| t.trim().is_empty()) {
                *tok = None;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;

    #[test]
    fn toml_sections_override_defaults() {
        let s = r#"
            [quota]
            daily_limit = 0

            [locale]
            label = "Mexico"
            tokens = [" MEXICO ", "", "cdmx"]

            [apify]
            max_posts_per_keyword = 5
        "#;
        let cfg: SyncConfig = toml::from_str(s).unwrap();
        let cfg = cfg.sanitized();
        assert_eq!(cfg.quota.daily_limit, 1);
        assert_eq!(cfg.locale.tokens, vec!["cdmx".to_string(), "mexico".to_string()]);
        assert_eq!(cfg.apify.max_posts_per_keyword, 5);
        assert_eq!(cfg.apify.profile_scraper_mode, "short");
        assert_eq!(cfg.pacing.keyword_delay_ms, 2_000);
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("APIFY_API_TOKEN", "apify-secret"),
            ("DAILY_KEYWORD_LIMIT", "7"),
            ("SCRAPE_REACTIONS", "true"),
            ("KEYWORD_DELAY_MS", "not-a-number"),
            ("HUBSPOT_TOKEN", "  "),
        ]
        .into_iter()
        .collect();
        let mut cfg = SyncConfig::default();
        cfg.apply_env_from(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.apify.token.as_deref(), Some("apify-secret"));
        assert_eq!(cfg.quota.daily_limit, 7);
        assert!(cfg.apify.scrape_reactions);
        assert_eq!(cfg.pacing.keyword_delay_ms, 2_000);
        assert!(cfg.hubspot.token.is_none());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_path_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);

        // nothing on disk: defaults
        let cfg = SyncConfig::load_default().unwrap();
        assert_eq!(cfg.quota.daily_limit, 10);

        // fallback file
        fs::create_dir_all("config").unwrap();
        fs::write(DEFAULT_TOML_PATH, "[quota]\ndaily_limit = 3\n").unwrap();
        assert_eq!(SyncConfig::load_default().unwrap().quota.daily_limit, 3);

        // env path wins
        let p_json = tmp.path().join("custom.json");
        fs::write(&p_json, r#"{"quota": {"daily_limit": 4}}"#).unwrap();
        env::set_var(ENV_CONFIG_PATH, p_json.display().to_string());
        assert_eq!(SyncConfig::load_default().unwrap().quota.daily_limit, 4);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(SyncConfig::load_default().is_err());
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
