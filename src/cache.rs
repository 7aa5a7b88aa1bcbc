//! Process-wide memoization of completed searches.
//!
//! Entries are immutable snapshots keyed by the query's canonical URL.
//! A later successful search for the same key replaces the entry whole
//! (last writer wins). Expiry is checked lazily on every read and in bulk
//! by [`ResultCache::sweep`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::time::Instant;

use crate::models::job::JobRecord;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Introspection view of one cached search.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub key: String,
    pub records: usize,
    pub stored_at: DateTime<Utc>,
}

pub trait ResultCache: Send + Sync {
    /// Live records for `key`. An expired entry is removed and reported as a miss.
    fn get(&self, key: &str) -> Option<Arc<Vec<JobRecord>>>;

    /// Store `records` under `key`, replacing any previous entry.
    fn set(&self, key: &str, records: Vec<JobRecord>);

    /// Drop every expired entry, returning how many were removed.
    fn sweep(&self) -> usize;

    /// Drop every entry, returning how many were removed.
    fn clear(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> Vec<CacheEntryInfo>;
}

struct CacheEntry {
    records: Arc<Vec<JobRecord>>,
    stored_at: Instant,
    stored_at_utc: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

/// In-memory TTL cache safe for concurrent readers and writers.
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Remove `key` only if it is still expired under the write lock, so an
    /// entry refreshed by a concurrent `set` survives.
    fn evict_if_expired(&self, key: &str) -> bool {
        let evicted = self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(self.ttl))
            .is_some();
        if evicted {
            tracing::debug!("Evicted expired cache entry {key}");
        }
        evicted
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<Vec<JobRecord>>> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => return Some(entry.records.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.evict_if_expired(key);
        }
        None
    }

    fn set(&self, key: &str, records: Vec<JobRecord>) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                records: Arc::new(records),
                stored_at: Instant::now(),
                stored_at_utc: Utc::now(),
            },
        );
    }

    fn sweep(&self) -> usize {
        let mut evicted = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(self.ttl);
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    fn clear(&self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn entries(&self) -> Vec<CacheEntryInfo> {
        self.entries
            .iter()
            .map(|entry| CacheEntryInfo {
                key: entry.key().clone(),
                records: entry.records.len(),
                stored_at: entry.stored_at_utc,
            })
            .collect()
    }
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl ResultCache for NoopCache {
    fn get(&self, _key: &str) -> Option<Arc<Vec<JobRecord>>> {
        None
    }

    fn set(&self, _key: &str, _records: Vec<JobRecord>) {}

    fn sweep(&self) -> usize {
        0
    }

    fn clear(&self) -> usize {
        0
    }

    fn len(&self) -> usize {
        0
    }

    fn entries(&self) -> Vec<CacheEntryInfo> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::SALARY_NOT_SPECIFIED;

    fn job(position: &str) -> JobRecord {
        JobRecord {
            position: position.to_string(),
            company: "Acme".to_string(),
            company_logo: String::new(),
            location: String::new(),
            date: String::new(),
            ago_time: String::new(),
            salary: SALARY_NOT_SPECIFIED.to_string(),
            job_url: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn live_entry_is_returned() {
        let cache = MemoryCache::default();
        cache.set("k", vec![job("a"), job("b")]);

        tokio::time::advance(Duration::from_secs(59 * 60)).await;
        let hit = cache.get("k").expect("entry should still be live");
        assert_eq!(hit.len(), 2);
        assert_eq!(hit[0].position, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_a_miss_and_removed_on_read() {
        let cache = MemoryCache::default();
        cache.set("k", vec![job("a")]);
        assert_eq!(cache.len(), 1);

        tokio::time::advance(DEFAULT_TTL + Duration::from_secs(1)).await;
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn set_overwrites_and_restamps() {
        let cache = MemoryCache::new(Duration::from_secs(10));
        cache.set("k", vec![job("old")]);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("k", vec![job("new"), job("newer")]);
        tokio::time::advance(Duration::from_secs(8)).await;

        let hit = cache.get("k").expect("overwritten entry should be fresh");
        assert_eq!(hit.len(), 2);
        assert_eq!(hit[0].position, "new");
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_expired_entries() {
        let cache = MemoryCache::new(Duration::from_secs(10));
        cache.set("old", vec![job("a")]);
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.set("fresh", vec![job("b")]);
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn refreshed_entry_survives_pending_eviction() {
        let cache = MemoryCache::new(Duration::from_secs(10));
        cache.set("k", vec![job("stale")]);
        tokio::time::advance(Duration::from_secs(11)).await;

        // A reader saw the stale entry; a writer refreshes it before the
        // reader gets to evict.
        cache.set("k", vec![job("fresh")]);
        assert!(!cache.evict_if_expired("k"));

        let hit = cache.get("k").expect("refreshed entry should survive");
        assert_eq!(hit[0].position, "fresh");
    }

    #[test]
    fn concurrent_readers_only_see_whole_snapshots() {
        let cache = MemoryCache::default();
        // Generation `g` stores `g % 7 + 1` records named `g-0`, `g-1`, ...
        let snapshot = |g: usize| -> Vec<JobRecord> {
            (0..g % 7 + 1).map(|i| job(&format!("{g}-{i}"))).collect()
        };

        std::thread::scope(|scope| {
            for writer in 0..4 {
                let cache = &cache;
                scope.spawn(move || {
                    for round in 0..500 {
                        cache.set("k", snapshot(round * 4 + writer));
                    }
                });
            }
            for _ in 0..4 {
                let cache = &cache;
                scope.spawn(move || {
                    for _ in 0..2_000 {
                        let Some(hit) = cache.get("k") else { continue };
                        let generation: usize = hit[0]
                            .position
                            .split('-')
                            .next()
                            .and_then(|g| g.parse().ok())
                            .expect("generation prefix");
                        assert_eq!(hit.len(), generation % 7 + 1);
                        for (i, record) in hit.iter().enumerate() {
                            assert_eq!(record.position, format!("{generation}-{i}"));
                        }
                    }
                });
            }
        });

        assert_eq!(cache.len(), 1);
        assert!(cache.get("k").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_counts_each_eviction() {
        let cache = MemoryCache::new(Duration::from_secs(10));
        for key in ["a", "b", "c"] {
            cache.set(key, vec![job(key)]);
        }
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.set("d", vec![job("d")]);

        assert_eq!(cache.sweep(), 3);
        assert_eq!(cache.sweep(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_and_introspection() {
        let cache = MemoryCache::default();
        cache.set("a", vec![job("1")]);
        cache.set("b", vec![job("2"), job("3")]);

        let mut entries = cache.entries();
        entries.sort_by(|x, y| x.key.cmp(&y.key));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].key, "b");
        assert_eq!(entries[1].records, 2);

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn noop_cache_never_hits() {
        let cache = NoopCache;
        cache.set("k", vec![job("a")]);
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
    }
}
