//! Two-tier cache for resolution outcomes
//!
//! The volatile session tier is an in-process map checked and written first;
//! the durable tier is a host-provided key-value store that survives
//! restarts. A write always updates both tiers; a read prefers the session
//! tier and promotes durable hits into it. Storage failures never surface to
//! resolution: they are logged at debug level and treated as a miss.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::{StorageError, StorageResult};
use crate::models::CacheValue;

/// Durable key-value storage, as provided by the host application.
///
/// Process-wide and restart-surviving. Implementations report failures; the
/// [`CacheStore`] decides that failures degrade to "no cache".
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// In-memory store. Used for tests and no-persistence deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable store backed by a single JSON file, written through on every set.
///
/// Suited to the cache's write pattern: one small write per first-time
/// resolution, reads served from the in-memory map loaded at open.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open a store at `path`, loading existing entries. A missing file is
    /// an empty store, not an error.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StorageError::Io(e)),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, snapshot: &HashMap<String, String>) -> StorageResult<()> {
        let data = serde_json::to_vec_pretty(snapshot)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.insert(key.to_string(), value.to_string());
            entries.clone()
        };
        self.persist(&snapshot).await
    }
}

/// Result of a cache read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Previously resolved to this URL
    Hit(String),
    /// Previously resolved: confirmed no logo exists
    Absent,
    /// Never looked up (or the cache was unreadable)
    Miss,
}

/// The two-tier cache store
pub struct CacheStore {
    session: RwLock<HashMap<String, String>>,
    durable: Option<Arc<dyn KeyValueStore>>,
}

impl CacheStore {
    /// `durable` is `None` in no-cache mode: outcomes then only live for the
    /// current session.
    pub fn new(durable: Option<Arc<dyn KeyValueStore>>) -> Self {
        Self {
            session: RwLock::new(HashMap::new()),
            durable,
        }
    }

    pub async fn get(&self, key: &str) -> CacheLookup {
        if let Some(raw) = self.session.read().await.get(key).cloned() {
            return decode(raw);
        }

        if let Some(durable) = &self.durable {
            match durable.get(key).await {
                Ok(Some(raw)) => {
                    // promote so later reads stay on the fast path
                    self.session
                        .write()
                        .await
                        .insert(key.to_string(), raw.clone());
                    return decode(raw);
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(key, error = %e, "durable cache read failed, treating as miss");
                }
            }
        }

        CacheLookup::Miss
    }

    pub async fn set(&self, key: &str, value: &CacheValue) {
        let raw = value.encode();
        self.session
            .write()
            .await
            .insert(key.to_string(), raw.clone());

        if let Some(durable) = &self.durable
            && let Err(e) = durable.set(key, &raw).await
        {
            debug!(key, error = %e, "durable cache write failed, keeping session entry only");
        }
    }
}

fn decode(raw: String) -> CacheLookup {
    match CacheValue::decode(&raw) {
        CacheValue::Url(url) => CacheLookup::Hit(url),
        CacheValue::Absent => CacheLookup::Absent,
    }
}
