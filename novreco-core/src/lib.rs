pub mod cache;
pub mod debounce;
pub mod error;
pub mod loader;
pub mod offline;
pub mod pagination;
pub mod predicate;
pub mod record;
pub mod remote;

pub use cache::{
    CacheConfig, CacheStats, CachedResponse, DEFAULT_MAX_RESPONSES, JsonResponseCache, LruCache,
    MemoryStorage, ResponseCache, ResponseJsonStorage, StorageStrategy, cache_key,
    create_response_cache, create_response_cache_with_config, default_cache_path,
};
pub use debounce::{DEFAULT_SEARCH_DELAY, SearchDebouncer};
pub use error::RecoError;
pub use loader::{ListLoader, LoadOutcome, LoadTicket};
pub use offline::{CachedRecordSource, DEFAULT_MAX_AGE, FetchStrategy};
pub use pagination::{
    DEFAULT_MAX_VISIBLE_PAGES, DEFAULT_PAGE_SIZE, ListConfig, ListController, PageState,
    page_count, visible_page_numbers,
};
pub use predicate::{AnyFieldContains, FieldFilters, FieldsContain, SearchPredicate};
pub use record::{Record, field_text, record_from, value_text};
pub use remote::{
    ApiCall, ApiCallType, CallHistory, ClientConfig, RecordClient, RecordSource, parse_records,
};
