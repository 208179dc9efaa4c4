//! Persistent TTL cache for aggregated search results
//!
//! Entries live in a single JSON file keyed by the exact query string.
//! Staleness is evaluated lazily on read; an expired entry is left in
//! place and simply overwritten by the next write for its key.

use crate::aggregator::AggregateResult;
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A single cached search result with its storage timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub data: AggregateResult,
}

/// File-backed search cache with a fixed freshness window.
///
/// Keys are raw query strings; no normalization is applied, so queries
/// differing in casing or whitespace occupy separate entries. The store
/// is loaded lazily on first access and written back after every `put`.
/// All access goes through one mutex, so concurrent writes for
/// different keys serialize instead of clobbering each other.
pub struct PriceCache {
    path: PathBuf,
    ttl: Duration,
    entries: Mutex<Option<HashMap<String, CacheEntry>>>,
}

impl PriceCache {
    pub fn new(path: PathBuf, ttl: Duration) -> Self {
        Self {
            path,
            ttl,
            entries: Mutex::new(None),
        }
    }

    /// Look up a fresh entry for `key`.
    ///
    /// Stale and missing entries both come back as `None`; stale ones
    /// are not deleted.
    pub fn get(&self, key: &str) -> Option<AggregateResult> {
        let mut guard = self.lock();
        let entries = guard.get_or_insert_with(|| Self::load(&self.path));

        let entry = entries.get(key)?;
        if Utc::now() - entry.timestamp < self.ttl {
            log::info!("Cache hit for {}", key);
            Some(entry.data.clone())
        } else {
            log::debug!("Cache entry for {} is stale", key);
            None
        }
    }

    /// Store `data` under `key`, replacing any prior entry, and persist
    /// the whole store. Write failures are logged, never propagated.
    pub fn put(&self, key: &str, data: &AggregateResult) {
        let mut guard = self.lock();
        let entries = guard.get_or_insert_with(|| Self::load(&self.path));

        entries.insert(
            key.to_string(),
            CacheEntry {
                timestamp: Utc::now(),
                data: data.clone(),
            },
        );

        if let Err(e) = Self::save(&self.path, entries) {
            log::error!("Cache write error: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<HashMap<String, CacheEntry>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Read the backing file; any failure means an empty cache.
    fn load(path: &Path) -> HashMap<String, CacheEntry> {
        if !path.exists() {
            log::info!("Starting with empty search cache");
            return HashMap::new();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Failed to parse cache file, starting fresh: {}", e);
                    HashMap::new()
                }
            },
            Err(e) => {
                log::warn!("Failed to read cache file, starting fresh: {}", e);
                HashMap::new()
            }
        }
    }

    fn save(path: &Path, entries: &HashMap<String, CacheEntry>) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(entries)?;
        std::fs::write(path, content)?;
        log::debug!("Saved search cache with {} entries", entries.len());
        Ok(())
    }
}
