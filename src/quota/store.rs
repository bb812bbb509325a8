// src/quota/store.rs
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::QuotaState;
use crate::error::{Result, SyncError};

/// Durable home of the quota window. Load on every operation, save on mutate.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<QuotaState>>;
    async fn save(&self, state: &QuotaState) -> Result<()>;
}

/// JSON file store, written atomically through a temp file + rename.
pub struct JsonFileQuotaStore {
    path: PathBuf,
}

impl JsonFileQuotaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuotaStore for JsonFileQuotaStore {
    async fn load(&self) -> Result<Option<QuotaState>> {
        let s = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SyncError::PersistenceFailed(format!(
                    "reading {}: {e}",
                    self.path.display()
                )))
            }
        };
        let state: QuotaState = serde_json::from_str(&s).map_err(|e| {
            SyncError::PersistenceFailed(format!("parsing {}: {e}", self.path.display()))
        })?;
        Ok(Some(state))
    }

    async fn save(&self, state: &QuotaState) -> Result<()> {
        write_atomic(&self.path, state).map_err(|e| {
            SyncError::PersistenceFailed(format!("writing {}: {e}", self.path.display()))
        })
    }
}

fn write_atomic(path: &Path, state: &QuotaState) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    f.sync_all()?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// In-process store; used by tests and ad-hoc runs.
#[derive(Default)]
pub struct MemoryQuotaStore {
    state: Mutex<Option<QuotaState>>,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: QuotaState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    pub fn snapshot(&self) -> Option<QuotaState> {
        self.state.lock().expect("quota store mutex poisoned").clone()
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn load(&self) -> Result<Option<QuotaState>> {
        Ok(self.snapshot())
    }

    async fn save(&self, state: &QuotaState) -> Result<()> {
        *self.state.lock().expect("quota store mutex poisoned") = Some(state.clone());
        Ok(())
    }
}
