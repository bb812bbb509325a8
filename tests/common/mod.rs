// tests/common/mod.rs
//
// In-memory keyword source, search provider, sinks and quota store for
// pipeline-level tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use keyword_post_sync::error::{Result, SyncError};
use keyword_post_sync::keywords::KeywordSource;
use keyword_post_sync::pipeline::Pipeline;
use keyword_post_sync::quota::{
    FixedClock, MemoryQuotaStore, QuotaState, QuotaStore, QuotaTracker,
};
use keyword_post_sync::search::ContentSearch;
use keyword_post_sync::sinks::RecordSink;
use keyword_post_sync::types::{Keyword, LocaleTag, SearchResult, SearchResultItem};

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date")
}

pub fn item(url: &str, keyword: &str) -> SearchResultItem {
    SearchResultItem {
        url: url.to_string(),
        text: format!("post about {keyword}"),
        author_name: Some("Ana".into()),
        author_profile_url: Some("https://www.linkedin.com/in/ana".into()),
        created_at: Some("2025-03-01".into()),
        location_hint: Some("CDMX".into()),
        location: LocaleTag::Target,
        origin_keyword: keyword.to_string(),
    }
}

// ---------- keyword source ----------

pub struct MockSource {
    pub keywords: Vec<Keyword>,
    pub fail: bool,
    pub calls: Mutex<u32>,
}

impl MockSource {
    pub fn with(texts: &[&str]) -> Self {
        Self {
            keywords: texts
                .iter()
                .enumerate()
                .map(|(i, t)| Keyword::new(format!("k{}", i + 1), *t))
                .collect(),
            fail: false,
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            keywords: Vec::new(),
            fail: true,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl KeywordSource for MockSource {
    async fn fetch_keywords(&self) -> Result<Vec<Keyword>> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(SyncError::SourceUnavailable("source down".into()));
        }
        Ok(self.keywords.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ---------- search ----------

#[derive(Default)]
pub struct MockSearch {
    results: HashMap<String, std::result::Result<Vec<SearchResultItem>, String>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returns(mut self, keyword: &str, urls: &[&str]) -> Self {
        let items = urls.iter().map(|u| item(u, keyword)).collect();
        self.results.insert(keyword.to_string(), Ok(items));
        self
    }

    pub fn fails(mut self, keyword: &str, msg: &str) -> Self {
        self.results.insert(keyword.to_string(), Err(msg.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSearch for MockSearch {
    async fn search(&self, keywords: &[String]) -> Result<SearchResult> {
        let kw = keywords.first().cloned().unwrap_or_default();
        self.calls.lock().unwrap().push(kw.clone());
        match self.results.get(&kw) {
            Some(Ok(items)) => Ok(SearchResult {
                total_raw: items.len(),
                items: items.clone(),
            }),
            Some(Err(msg)) => Err(SyncError::SearchFailed(msg.clone())),
            None => Ok(SearchResult::default()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ---------- sinks ----------

pub struct MockSink {
    id: &'static str,
    /// Stored record bodies; dedup scans these for the URL.
    records: Mutex<Vec<String>>,
    fail_urls: HashSet<String>,
    lookup_fails: bool,
    pub lookups: Mutex<u32>,
}

impl MockSink {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            records: Mutex::new(Vec::new()),
            fail_urls: HashSet::new(),
            lookup_fails: false,
            lookups: Mutex::new(0),
        }
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.fail_urls.insert(url.to_string());
        self
    }

    pub fn with_broken_lookup(mut self) -> Self {
        self.lookup_fails = true;
        self
    }

    pub fn with_existing(self, body: &str) -> Self {
        self.records.lock().unwrap().push(body.to_string());
        self
    }

    pub fn records(&self) -> Vec<String> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for MockSink {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn find_existing(&self, natural_key: &str) -> Result<bool> {
        *self.lookups.lock().unwrap() += 1;
        if self.lookup_fails {
            return Err(SyncError::write_failed(self.id, "lookup unavailable"));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.contains(natural_key)))
    }

    async fn create_record(&self, item: &SearchResultItem, keyword: &Keyword) -> Result<String> {
        if self.fail_urls.contains(&item.url) {
            return Err(SyncError::write_failed(self.id, "rejected by backend"));
        }
        let mut records = self.records.lock().unwrap();
        records.push(format!("Keyword: {}\nPost URL: {}\n", keyword.text, item.url));
        Ok(format!("{}-{}", self.id, records.len()))
    }
}

// ---------- quota store ----------

/// Store whose every load/save fails.
pub struct BrokenStore;

#[async_trait]
impl QuotaStore for BrokenStore {
    async fn load(&self) -> Result<Option<QuotaState>> {
        Err(SyncError::PersistenceFailed("disk unavailable".into()))
    }

    async fn save(&self, _state: &QuotaState) -> Result<()> {
        Err(SyncError::PersistenceFailed("disk unavailable".into()))
    }
}

// ---------- assembly ----------

pub struct Harness {
    pub store: Arc<MemoryQuotaStore>,
    pub clock: Arc<FixedClock>,
    pub source: Arc<MockSource>,
    pub search: Arc<MockSearch>,
}

impl Harness {
    pub fn new(source: MockSource, search: MockSearch) -> Self {
        Self {
            store: Arc::new(MemoryQuotaStore::new()),
            clock: Arc::new(FixedClock::new(day(1))),
            source: Arc::new(source),
            search: Arc::new(search),
        }
    }

    pub fn with_used(self, count: u32, limit: u32) -> Self {
        let store = Arc::new(MemoryQuotaStore::with_state(QuotaState {
            window_date: day(1),
            count,
            limit,
        }));
        Self { store, ..self }
    }

    pub fn pipeline(&self, limit: u32, sinks: Vec<Arc<dyn RecordSink>>) -> Pipeline {
        let quota = QuotaTracker::new(self.store.clone(), limit, self.clock.clone());
        sinks.into_iter().fold(
            Pipeline::new(quota, self.source.clone(), self.search.clone()),
            |p, s| p.with_sink(s),
        )
    }
}

// ---------- fake vendor servers ----------

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake server");
    });
    format!("http://{addr}")
}
