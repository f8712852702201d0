//! Offline copies of list responses, keyed by request URL.

use super::lru_cache::{CacheConfig, LruCache};
use super::response_storage::ResponseJsonStorage;
use crate::error::RecoError;
use crate::record::Record;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

const CACHE_FILENAME: &str = "list_responses.json";
const RESPONSE_SIZE_ESTIMATE: u64 = 64 * 1024; // a few hundred rows of check-in data
pub const DEFAULT_MAX_RESPONSES: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub url: String,
    pub records: Vec<Record>,
}

impl CachedResponse {
    pub fn new(url: &str, records: Vec<Record>) -> Self {
        Self {
            url: url.to_string(),
            records,
        }
    }
}

/// Response cache over any storage strategy
pub type ResponseCache<S> = LruCache<String, CachedResponse, S>;

/// Response cache persisted to a JSON file
pub type JsonResponseCache = ResponseCache<ResponseJsonStorage>;

/// Stable cache key for a request URL.
///
/// URLs carry query strings with dates and ids; hashing keeps keys uniform.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `<platform cache dir>/novreco/list_responses.json`, or a temp-dir fallback.
pub fn default_cache_path() -> PathBuf {
    ProjectDirs::from("", "", "novreco")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("novreco-cache"))
        .join(CACHE_FILENAME)
}

pub fn create_response_cache() -> Result<JsonResponseCache, RecoError> {
    create_response_cache_with_config(default_cache_path(), DEFAULT_MAX_RESPONSES)
}

pub fn create_response_cache_with_config(
    cache_file: PathBuf,
    max_responses: usize,
) -> Result<JsonResponseCache, RecoError> {
    let storage = ResponseJsonStorage::new(cache_file, RESPONSE_SIZE_ESTIMATE)?;
    let config = CacheConfig {
        max_entries: Some(max_responses),
        max_size_bytes: Some(max_responses as u64 * RESPONSE_SIZE_ESTIMATE),
        eager_persistence: true,
    };
    Ok(LruCache::new(storage, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record_from;
    use serde_json::json;
    use std::env;

    fn response(path: &str, rows: usize) -> CachedResponse {
        let records = (0..rows)
            .map(|i| record_from([("id", json!(i)), ("name", json!(format!("User {}", i)))]))
            .collect();
        CachedResponse::new(&format!("https://reco.example.com/api/{}", path), records)
    }

    #[test]
    fn test_cache_key_is_stable_hex() {
        let a = cache_key("https://reco.example.com/api/checkins?date=2024-05-01");
        let b = cache_key("https://reco.example.com/api/checkins?date=2024-05-02");
        assert_ne!(a, b);
        assert_eq!(a, cache_key(" https://reco.example.com/api/checkins?date=2024-05-01 "));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_default_path_file_name() {
        assert!(default_cache_path().ends_with(CACHE_FILENAME));
    }

    #[test]
    fn test_persists_across_instances() {
        let file = env::temp_dir().join(format!("novreco-responses-{}.json", std::process::id()));
        let entry = response("employees", 3);
        let key = cache_key(&entry.url);

        {
            let mut cache = create_response_cache_with_config(file.clone(), 10).unwrap();
            cache.insert(key.clone(), entry.clone()).unwrap();
        }
        {
            let mut cache = create_response_cache_with_config(file.clone(), 10).unwrap();
            assert_eq!(cache.get(&key), Some(entry));
            cache.clear().unwrap();
        }
        std::fs::remove_file(file).ok();
    }

    #[test]
    fn test_entry_limit() {
        let file = env::temp_dir().join(format!("novreco-limit-{}.json", std::process::id()));
        let mut cache = create_response_cache_with_config(file.clone(), 2).unwrap();
        for path in ["checkins", "employees", "users"] {
            let entry = response(path, 1);
            cache.insert(cache_key(&entry.url), entry).unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&cache_key("https://reco.example.com/api/checkins")));
        cache.clear().unwrap();
        std::fs::remove_file(file).ok();
    }
}
