//! Single-file JSON persistence for cached list responses.

use super::lru_cache::{CacheEntry, StorageStrategy};
use super::response_cache::CachedResponse;
use crate::error::RecoError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{debug, info};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ResponseCacheFile {
    entries: HashMap<String, CacheEntry<CachedResponse>>,
    last_updated: OffsetDateTime,
    metadata: ResponseCacheMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResponseCacheMetadata {
    version: u32,
    cache_type: String,
}

pub struct ResponseJsonStorage {
    cache_file: PathBuf,
    size_estimate: u64,
}

impl ResponseJsonStorage {
    /// Creates the parent directory of `cache_file` if needed.
    pub fn new(cache_file: PathBuf, size_estimate: u64) -> Result<Self, RecoError> {
        if let Some(parent) = cache_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                info!(cache_dir = %parent.display(), "Created response cache directory");
            }
        }
        Ok(Self {
            cache_file,
            size_estimate,
        })
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }
}

impl StorageStrategy<String, CachedResponse> for ResponseJsonStorage {
    fn load(&self) -> Result<HashMap<String, CacheEntry<CachedResponse>>, RecoError> {
        if !self.cache_file.exists() {
            debug!(cache_file = %self.cache_file.display(), "No response cache on disk yet");
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.cache_file)?;
        let file: ResponseCacheFile = serde_json::from_str(&content)?;
        if file.metadata.version != FORMAT_VERSION {
            return Err(RecoError::Cache(format!(
                "unsupported response cache version {}",
                file.metadata.version
            )));
        }

        info!(
            entries = file.entries.len(),
            cache_file = %self.cache_file.display(),
            "Loaded response cache from disk"
        );
        Ok(file.entries)
    }

    fn save(&self, entries: &HashMap<String, CacheEntry<CachedResponse>>) -> Result<(), RecoError> {
        let file = ResponseCacheFile {
            entries: entries.clone(),
            last_updated: OffsetDateTime::now_utc(),
            metadata: ResponseCacheMetadata {
                version: FORMAT_VERSION,
                cache_type: "ListResponses".to_string(),
            },
        };

        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&self.cache_file, json)?;

        debug!(
            entries = entries.len(),
            cache_file = %self.cache_file.display(),
            "Saved response cache to disk"
        );
        Ok(())
    }

    fn size_estimate(&self) -> u64 {
        self.size_estimate
    }

    fn evict_entry(&self, _key: &String, _value: &CachedResponse) -> Result<(), RecoError> {
        // Everything lives in the one file, rewritten on the next save
        Ok(())
    }

    fn strategy_name(&self) -> &'static str {
        "ResponseJsonStorage"
    }
}
