//! # Quota
//! Daily keyword quota: how many keywords may be searched per calendar day.
//!
//! The window lives in an explicit [`QuotaState`] persisted by a [`QuotaStore`].
//! Every operation loads the state, rolls it to today if needed and, for
//! increments only, saves it back. Reads never write.

pub mod store;

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
pub use store::{JsonFileQuotaStore, MemoryQuotaStore, QuotaStore};

/// Persisted quota window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaState {
    pub window_date: NaiveDate,
    pub count: u32,
    pub limit: u32,
}

impl QuotaState {
    pub fn fresh(today: NaiveDate, limit: u32) -> Self {
        Self {
            window_date: today,
            count: 0,
            limit,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }
}

/// Read-only snapshot handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStats {
    pub count: u32,
    pub limit: u32,
    pub remaining: u32,
    pub window_date: NaiveDate,
}

impl From<&QuotaState> for QuotaStats {
    fn from(s: &QuotaState) -> Self {
        Self {
            count: s.count,
            limit: s.limit,
            remaining: s.remaining(),
            window_date: s.window_date,
        }
    }
}

/// Source of "today" for window rollover.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    day: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: Mutex::new(day),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        *self.day.lock().expect("clock mutex poisoned") = day;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.day.lock().expect("clock mutex poisoned")
    }
}

pub struct QuotaTracker {
    store: Arc<dyn QuotaStore>,
    limit: u32,
    clock: Arc<dyn Clock>,
}

impl QuotaTracker {
    /// `limit` is the configured daily limit; it wins over a stored one.
    pub fn new(store: Arc<dyn QuotaStore>, limit: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            limit: limit.max(1),
            clock,
        }
    }

    pub fn with_system_clock(store: Arc<dyn QuotaStore>, limit: u32) -> Self {
        Self::new(store, limit, Arc::new(SystemClock))
    }

    /// Current window, rolled to today. Not persisted.
    async fn current(&self) -> Result<QuotaState> {
        let today = self.clock.today();
        let state = match self.store.load().await? {
            Some(s) if s.window_date == today => QuotaState {
                limit: self.limit,
                ..s
            },
            Some(s) => {
                debug!(target: "quota", from = %s.window_date, to = %today, "quota window rolled");
                QuotaState::fresh(today, self.limit)
            }
            None => QuotaState::fresh(today, self.limit),
        };
        Ok(state)
    }

    pub async fn can_process_more(&self) -> Result<bool> {
        Ok(self.current().await?.remaining() > 0)
    }

    pub async fn stats(&self) -> Result<QuotaStats> {
        Ok(QuotaStats::from(&self.current().await?))
    }

    /// Add `n` processed keywords to today's window and persist it.
    pub async fn increment(&self, n: u32) -> Result<QuotaStats> {
        let mut state = self.current().await?;
        state.count = state.count.saturating_add(n);
        self.store.save(&state).await?;
        let stats = QuotaStats::from(&state);
        metrics::gauge!("quota_remaining").set(stats.remaining as f64);
        info!(
            target: "quota",
            added = n,
            count = stats.count,
            limit = stats.limit,
            remaining = stats.remaining,
            "quota advanced"
        );
        Ok(stats)
    }
}
