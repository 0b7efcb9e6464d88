//! In-memory cache backend.
//!
//! DashMap-based reference implementation of [`CacheBackend`], with
//! store-side TTL expiry, prefix pattern deletion and hit/miss statistics.
//! Stale entries are dropped lazily on read and swept probabilistically on
//! insert so no write ever pays a full O(n) scan.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::CacheError;
use crate::store::CacheBackend;

/// Probability (1/N) of sweeping stale entries on insert.
const CLEANUP_PROBABILITY: u32 = 64;

/// A stored payload with its expiry bookkeeping.
#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    stored_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Default)]
struct CacheStatistics {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    insertions: AtomicU64,
    size: AtomicUsize,
}

impl CacheStatistics {
    fn hit_ratio(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            size: self.size.load(Ordering::Relaxed),
            hit_ratio: self.hit_ratio(),
        }
    }
}

/// A point-in-time snapshot of cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub insertions: u64,
    pub size: usize,
    pub hit_ratio: f64,
}

/// Thread-safe in-memory cache backend with TTL expiry.
#[derive(Debug, Default)]
pub struct MemoryCacheBackend {
    entries: DashMap<String, Entry>,
    stats: Arc<CacheStatistics>,
}

impl MemoryCacheBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Current number of entries, expired entries included until swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the backend holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the TTL an unexpired entry was stored with.
    #[must_use]
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.ttl)
    }

    /// Removes every expired entry.
    pub fn cleanup_expired(&self) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired())
            .map(|entry| entry.key().clone())
            .collect();

        for key in expired {
            if self.entries.remove(&key).is_some() {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.stats.size.store(self.entries.len(), Ordering::Relaxed);
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry); // release the read lock before removing
                self.entries.remove(key);
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                self.stats.size.store(self.entries.len(), Ordering::Relaxed);
                return Ok(None);
            }
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(entry.bytes.clone()));
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn set(&self, key: &str, bytes: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        if fastrand::u32(0..CLEANUP_PROBABILITY) == 0 {
            self.cleanup_expired();
        }

        self.entries.insert(
            key.to_string(),
            Entry {
                bytes,
                stored_at: Instant::now(),
                ttl,
            },
        );
        self.stats.insertions.fetch_add(1, Ordering::Relaxed);
        self.stats.size.store(self.entries.len(), Ordering::Relaxed);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self.entries.remove(key).is_some();
        self.stats.size.store(self.entries.len(), Ordering::Relaxed);
        Ok(removed)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let count = match pattern.strip_suffix('*') {
            Some(prefix) => {
                let matching: Vec<String> = self
                    .entries
                    .iter()
                    .filter(|entry| entry.key().starts_with(prefix))
                    .map(|entry| entry.key().clone())
                    .collect();
                matching
                    .into_iter()
                    .filter(|key| self.entries.remove(key).is_some())
                    .count()
            }
            None => usize::from(self.entries.remove(pattern).is_some()),
        };
        self.stats.size.store(self.entries.len(), Ordering::Relaxed);
        Ok(count)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
