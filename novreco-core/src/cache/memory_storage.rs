//! In-memory storage strategy.
//!
//! Keeps entries only for the life of the process. Hosts use it when offline
//! persistence is switched off; tests use the recorded evictions and saves to
//! check LRU behaviour without touching the disk.

use super::lru_cache::{CacheEntry, StorageStrategy};
use crate::error::RecoError;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

const DEFAULT_SIZE_ESTIMATE: u64 = 100;

#[derive(Debug)]
struct Inner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    evicted: Vec<(K, V)>,
    saves: usize,
}

/// Cloning yields another handle onto the same entries.
#[derive(Debug, Clone)]
pub struct MemoryStorage<K, V> {
    inner: Arc<Mutex<Inner<K, V>>>,
    size_per_entry: u64,
    fail_saves: bool,
}

impl<K, V> MemoryStorage<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_size_estimate(DEFAULT_SIZE_ESTIMATE)
    }

    pub fn with_size_estimate(size_per_entry: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                evicted: Vec::new(),
                saves: 0,
            })),
            size_per_entry,
            fail_saves: false,
        }
    }

    /// Makes every `save` fail, to exercise error propagation.
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Seeds entries as if left behind by an earlier run.
    pub fn preload(&self, entries: HashMap<K, CacheEntry<V>>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries = entries;
        }
    }

    pub fn stored(&self) -> HashMap<K, CacheEntry<V>> {
        self.inner
            .lock()
            .map(|inner| inner.entries.clone())
            .unwrap_or_default()
    }

    pub fn evicted(&self) -> Vec<(K, V)> {
        self.inner
            .lock()
            .map(|inner| inner.evicted.clone())
            .unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.saves).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner<K, V>>, RecoError> {
        self.inner
            .lock()
            .map_err(|_| RecoError::Cache("memory storage lock poisoned".to_string()))
    }
}

impl<K, V> Default for MemoryStorage<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> StorageStrategy<K, V> for MemoryStorage<K, V>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Send,
{
    fn load(&self) -> Result<HashMap<K, CacheEntry<V>>, RecoError> {
        Ok(self.lock()?.entries.clone())
    }

    fn save(&self, entries: &HashMap<K, CacheEntry<V>>) -> Result<(), RecoError> {
        if self.fail_saves {
            return Err(RecoError::Cache("simulated save failure".to_string()));
        }
        let mut inner = self.lock()?;
        inner.saves += 1;
        inner.entries = entries.clone();
        Ok(())
    }

    fn size_estimate(&self) -> u64 {
        self.size_per_entry
    }

    fn evict_entry(&self, key: &K, value: &V) -> Result<(), RecoError> {
        let mut inner = self.lock()?;
        inner.evicted.push((key.clone(), value.clone()));
        inner.entries.remove(key);
        Ok(())
    }

    fn strategy_name(&self) -> &'static str {
        "MemoryStorage"
    }
}
