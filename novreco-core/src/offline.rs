//! Cache-then-network fetching of list data.
//!
//! The web client's service worker answered list requests from its cache
//! first and went to the network on a miss. `CachedRecordSource` offers that
//! behaviour plus a network-first mode that falls back to the last good copy
//! when the backend is unreachable.

use crate::cache::{CachedResponse, ResponseCache, StorageStrategy, cache_key};
use crate::error::RecoError;
use crate::record::Record;
use crate::remote::{ApiCallType, CallHistory, RecordSource};
use std::str::FromStr;
use std::sync::Mutex;
use time::Duration;
use tracing::{debug, info, warn};

/// Cached copies older than this are refetched under `CacheFirst`.
pub const DEFAULT_MAX_AGE: Duration = Duration::hours(24);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// Serve a fresh cached copy, fetch only on a miss or when expired.
    #[default]
    CacheFirst,
    /// Always try the network; serve the cached copy if that fails.
    NetworkFirst,
    /// Never read the cache. Successful responses are still stored.
    NetworkOnly,
}

impl FromStr for FetchStrategy {
    type Err = RecoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cache-first" | "cache" => Ok(FetchStrategy::CacheFirst),
            "network-first" | "network" => Ok(FetchStrategy::NetworkFirst),
            "network-only" => Ok(FetchStrategy::NetworkOnly),
            other => Err(RecoError::InvalidPayload(format!(
                "unknown fetch strategy '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStrategy::CacheFirst => write!(f, "cache-first"),
            FetchStrategy::NetworkFirst => write!(f, "network-first"),
            FetchStrategy::NetworkOnly => write!(f, "network-only"),
        }
    }
}

pub struct CachedRecordSource<S, St>
where
    S: RecordSource,
    St: StorageStrategy<String, CachedResponse>,
{
    source: S,
    cache: Mutex<ResponseCache<St>>,
    strategy: FetchStrategy,
    max_age: Duration,
    history: CallHistory,
}

impl<S, St> CachedRecordSource<S, St>
where
    S: RecordSource,
    St: StorageStrategy<String, CachedResponse>,
{
    pub fn new(source: S, cache: ResponseCache<St>, strategy: FetchStrategy) -> Self {
        Self {
            source,
            cache: Mutex::new(cache),
            strategy,
            max_age: DEFAULT_MAX_AGE,
            history: CallHistory::default(),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Records cache hits and misses into `history`, e.g. the client's own.
    pub fn with_history(mut self, history: CallHistory) -> Self {
        self.history = history;
        self
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    pub fn history(&self) -> &CallHistory {
        &self.history
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn fetch_records(&self, url: &str) -> Result<Vec<Record>, RecoError> {
        match self.strategy {
            FetchStrategy::CacheFirst => {
                if let Some(records) = self.cached(url, Some(self.max_age))? {
                    return Ok(records);
                }
                self.fetch_and_store(url).await
            }
            FetchStrategy::NetworkFirst => match self.fetch_and_store(url).await {
                Ok(records) => Ok(records),
                Err(e) if e.is_network() => {
                    warn!(url = %url, error = %e, "Network failed, trying offline copy");
                    match self.cached(url, None)? {
                        Some(records) => Ok(records),
                        None => Err(e),
                    }
                }
                Err(e) => Err(e),
            },
            FetchStrategy::NetworkOnly => self.fetch_and_store(url).await,
        }
    }

    /// Drops the cached copy of `url`, e.g. after the host changed the data.
    pub fn invalidate(&self, url: &str) -> Result<bool, RecoError> {
        self.lock_cache()?.evict(&cache_key(url))
    }

    pub fn clear(&self) -> Result<(), RecoError> {
        self.lock_cache()?.clear()
    }

    pub fn cached_len(&self) -> Result<usize, RecoError> {
        Ok(self.lock_cache()?.len())
    }

    fn cached(&self, url: &str, max_age: Option<Duration>) -> Result<Option<Vec<Record>>, RecoError> {
        let mut cache = self.lock_cache()?;
        let key = cache_key(url);
        let fresh = cache
            .peek(&key)
            .map(|entry| max_age.is_none_or(|max_age| !entry.is_older_than(max_age)));

        match fresh {
            Some(true) => {
                let entry = cache.get_entry(&key);
                drop(cache);
                self.history.record_cache_operation(url, ApiCallType::CacheHit);
                debug!(url = %url, "Serving list from offline cache");
                Ok(entry.map(|entry| entry.value.records))
            }
            Some(false) => {
                debug!(url = %url, "Offline copy expired");
                self.history.record_cache_operation(url, ApiCallType::CacheMiss);
                Ok(None)
            }
            None => {
                self.history.record_cache_operation(url, ApiCallType::CacheMiss);
                Ok(None)
            }
        }
    }

    async fn fetch_and_store(&self, url: &str) -> Result<Vec<Record>, RecoError> {
        let records = self.source.fetch(url).await?;
        // a failed cache write never costs the caller fresh data
        let stored = self.lock_cache().and_then(|mut cache| {
            cache.insert(cache_key(url), CachedResponse::new(url, records.clone()))
        });
        match stored {
            Ok(()) => {
                info!(url = %url, records = records.len(), "Stored list response for offline use")
            }
            Err(e) => warn!(url = %url, error = %e, "Could not store list response for offline use"),
        }
        Ok(records)
    }

    fn lock_cache(&self) -> Result<std::sync::MutexGuard<'_, ResponseCache<St>>, RecoError> {
        self.cache
            .lock()
            .map_err(|_| RecoError::Cache("response cache lock poisoned".to_string()))
    }
}

impl<S, St> RecordSource for CachedRecordSource<S, St>
where
    S: RecordSource,
    St: StorageStrategy<String, CachedResponse>,
{
    async fn fetch(&self, url: &str) -> Result<Vec<Record>, RecoError> {
        self.fetch_records(url).await
    }
}
