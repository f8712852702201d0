pub mod lru_cache;
pub mod memory_storage;
pub mod response_cache;
pub mod response_storage;

pub use lru_cache::{CacheConfig, CacheEntry, CacheStats, LruCache, StorageStrategy};
pub use memory_storage::MemoryStorage;
pub use response_cache::{
    CachedResponse, DEFAULT_MAX_RESPONSES, JsonResponseCache, ResponseCache, cache_key,
    create_response_cache, create_response_cache_with_config, default_cache_path,
};
pub use response_storage::ResponseJsonStorage;
