//! In-memory result cache for source searches.
//!
//! Entries are keyed by `(query, limit)` and stamped with the time they were
//! stored. A lookup returns [`CacheResult::Hit`] only while the entry is
//! younger than the configured duration. Nothing is evicted automatically;
//! stale entries stay until [`ResultCache::purge_expired`] or
//! [`ResultCache::clear`] is called, so the cache grows with the number of
//! distinct queries for the life of the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::models::Paper;

/// Default time-to-live for cached results
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(3600);

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    /// Item was found and is valid
    Hit(T),

    /// Item was not found
    Miss,

    /// Item was found but has expired
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    limit: usize,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    papers: Vec<Paper>,
}

/// Per-client cache of validated search results
#[derive(Debug)]
pub struct ResultCache {
    enabled: bool,
    duration: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl ResultCache {
    pub fn new(duration: Duration) -> Self {
        Self {
            enabled: true,
            duration,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(DEFAULT_CACHE_DURATION)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up results for `(query, limit)`
    pub fn get(&self, query: &str, limit: usize) -> CacheResult<Vec<Paper>> {
        if !self.enabled {
            return CacheResult::Miss;
        }

        let key = CacheKey {
            query: query.to_string(),
            limit,
        };
        match self.entries().get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.duration => {
                CacheResult::Hit(entry.papers.clone())
            }
            Some(_) => CacheResult::Expired,
            None => CacheResult::Miss,
        }
    }

    /// Store results for `(query, limit)`, replacing any previous entry
    pub fn put(&self, query: &str, limit: usize, papers: Vec<Paper>) {
        if !self.enabled {
            return;
        }

        let key = CacheKey {
            query: query.to_string(),
            limit,
        };
        self.entries().insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                papers,
            },
        );
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let duration = self.duration;
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < duration);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("Purged {} expired cache entries", removed);
        }
        removed
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DURATION)
    }
}
