//! LRU cache with pluggable persistence.
//!
//! Recency is tracked with a per-cache access counter rather than wall-clock
//! time, so two touches within the same clock tick still order correctly.
//! Wall-clock timestamps are kept alongside for expiry and statistics.

use crate::error::RecoError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

/// A cached value with its bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created_at: OffsetDateTime,
    pub last_accessed: OffsetDateTime,
    #[serde(default)]
    pub access_seq: u64,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            value,
            created_at: now,
            last_accessed: now,
            access_seq: 0,
        }
    }

    pub fn age(&self) -> Duration {
        OffsetDateTime::now_utc() - self.created_at
    }

    pub fn is_older_than(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }
}

/// Where a cache keeps its entries between runs
pub trait StorageStrategy<K, V>: Send + Sync
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn load(&self) -> Result<HashMap<K, CacheEntry<V>>, RecoError>;

    fn save(&self, entries: &HashMap<K, CacheEntry<V>>) -> Result<(), RecoError>;

    /// Fixed per-entry size estimate, keeps size accounting O(1)
    fn size_estimate(&self) -> u64;

    /// Cleanup hook for an entry leaving the cache
    fn evict_entry(&self, key: &K, value: &V) -> Result<(), RecoError>;

    fn strategy_name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries (None = unlimited)
    pub max_entries: Option<usize>,
    /// Maximum total estimated size in bytes (None = unlimited)
    pub max_size_bytes: Option<u64>,
    /// Save after every mutation instead of only on explicit save
    pub eager_persistence: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: Some(200),
            max_size_bytes: None,
            eager_persistence: true,
        }
    }
}

pub struct LruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: StorageStrategy<K, V>,
{
    entries: HashMap<K, CacheEntry<V>>,
    storage: S,
    config: CacheConfig,
    next_seq: u64,
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: StorageStrategy<K, V>,
{
    /// Creates the cache and loads whatever the storage already holds.
    /// A storage that fails to load leaves the cache empty rather than failing.
    pub fn new(storage: S, config: CacheConfig) -> Self {
        let mut cache = Self {
            entries: HashMap::new(),
            storage,
            config,
            next_seq: 1,
        };
        cache.load_from_storage();
        cache
    }

    /// Returns a clone of the value and marks it most recently used
    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_entry(key).map(|entry| entry.value)
    }

    /// Like `get`, but returns the entry with its timestamps
    pub fn get_entry(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let seq = self.bump_seq();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_accessed = OffsetDateTime::now_utc();
                entry.access_seq = seq;
                debug!(strategy = %self.storage.strategy_name(), "Cache HIT");
                Some(entry.clone())
            }
            None => {
                debug!(strategy = %self.storage.strategy_name(), "Cache MISS");
                None
            }
        }
    }

    /// Reads an entry without affecting recency
    pub fn peek(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) -> Result<(), RecoError> {
        self.ensure_space_for(&key)?;

        let mut entry = CacheEntry::new(value);
        entry.access_seq = self.bump_seq();
        self.entries.insert(key, entry);

        debug!(
            strategy = %self.storage.strategy_name(),
            entries = self.entries.len(),
            "Inserted cache entry"
        );

        if self.config.eager_persistence {
            self.save_to_storage()?;
        }
        Ok(())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn size_bytes(&self) -> u64 {
        (self.entries.len() as u64) * self.storage.size_estimate()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Removes one entry. Returns false if it was not cached.
    pub fn evict(&mut self, key: &K) -> Result<bool, RecoError> {
        let Some(entry) = self.entries.remove(key) else {
            return Ok(false);
        };
        self.storage.evict_entry(key, &entry.value)?;
        debug!(strategy = %self.storage.strategy_name(), "Force evicted cache entry");

        if self.config.eager_persistence {
            self.save_to_storage()?;
        }
        Ok(true)
    }

    /// Drops entries created more than `max_age` ago. Returns how many went.
    pub fn purge_older_than(&mut self, max_age: Duration) -> Result<usize, RecoError> {
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_older_than(max_age))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(entry) = self.entries.remove(key) {
                self.storage.evict_entry(key, &entry.value)?;
            }
        }

        if !expired.is_empty() {
            info!(
                strategy = %self.storage.strategy_name(),
                purged = expired.len(),
                "Purged expired cache entries"
            );
            if self.config.eager_persistence {
                self.save_to_storage()?;
            }
        }
        Ok(expired.len())
    }

    pub fn clear(&mut self) -> Result<(), RecoError> {
        for (key, entry) in &self.entries {
            self.storage.evict_entry(key, &entry.value)?;
        }
        self.entries.clear();
        self.save_to_storage()?;

        info!(strategy = %self.storage.strategy_name(), "Cleared all cache entries");
        Ok(())
    }

    pub fn save_to_storage(&self) -> Result<(), RecoError> {
        self.storage.save(&self.entries)?;
        debug!(
            strategy = %self.storage.strategy_name(),
            entries = self.entries.len(),
            "Saved cache to storage"
        );
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len(),
            size_bytes: self.size_bytes(),
            oldest_entry: self.entries.values().map(|entry| entry.created_at).min(),
            most_recent_access: self.entries.values().map(|entry| entry.last_accessed).max(),
        }
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn load_from_storage(&mut self) {
        match self.storage.load() {
            Ok(entries) => {
                self.entries = entries;
                self.next_seq = self
                    .entries
                    .values()
                    .map(|entry| entry.access_seq)
                    .max()
                    .unwrap_or(0)
                    + 1;
                info!(
                    strategy = %self.storage.strategy_name(),
                    entries = self.entries.len(),
                    "Loaded cache from storage"
                );
            }
            Err(e) => {
                warn!(
                    strategy = %self.storage.strategy_name(),
                    error = %e,
                    "Failed to load cache from storage, starting empty"
                );
                self.entries.clear();
            }
        }
    }

    fn ensure_space_for(&mut self, new_key: &K) -> Result<(), RecoError> {
        if self.entries.contains_key(new_key) {
            return Ok(());
        }

        let mut to_evict = 0;
        if let Some(max_entries) = self.config.max_entries {
            to_evict = (self.entries.len() + 1).saturating_sub(max_entries);
        }
        if let Some(max_size) = self.config.max_size_bytes {
            let per_entry = self.storage.size_estimate().max(1);
            let fits = (max_size / per_entry) as usize;
            to_evict = to_evict.max((self.entries.len() + 1).saturating_sub(fits));
        }

        if to_evict > 0 {
            self.evict_lru_entries(to_evict)?;
        }
        Ok(())
    }

    fn evict_lru_entries(&mut self, count: usize) -> Result<(), RecoError> {
        let mut by_recency: Vec<(K, u64)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.access_seq))
            .collect();
        by_recency.sort_by_key(|(_, seq)| *seq);

        let mut evicted = 0;
        for (key, _) in by_recency.into_iter().take(count) {
            if let Some(entry) = self.entries.remove(&key) {
                self.storage.evict_entry(&key, &entry.value)?;
                evicted += 1;
            }
        }

        if evicted > 0 {
            info!(
                strategy = %self.storage.strategy_name(),
                evicted_count = evicted,
                "Evicted LRU entries"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entry_count: usize,
    pub size_bytes: u64,
    pub oldest_entry: Option<OffsetDateTime>,
    pub most_recent_access: Option<OffsetDateTime>,
}
