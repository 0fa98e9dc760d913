//! Kinoteka cache layer.
//!
//! Search-index results are cached by a key derived from the query that
//! produced them:
//!
//! - **Store port**: [`CacheStore`] speaks bytes with a TTL (Redis in
//!   production, [`MemoryCacheStore`] otherwise)
//! - **Adapter**: [`ObjectCache`] serializes payloads and turns every store
//!   failure into a miss
//! - **Executor**: [`CacheAside`] checks the cache, falls back to the index
//!   and populates the cache on a non-empty result
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! film_ttl_seconds = 300
//! genre_ttl_seconds = 60
//! ```

mod aside;
mod config;
pub mod keys;
mod memory;
mod store;

pub use aside::CacheAside;
pub use config::CacheConfig;
pub use keys::descriptor_key;
pub use memory::MemoryCacheStore;
pub use store::{CacheStore, CacheStoreError, ObjectCache};

pub const METRIC_CACHE_HIT: &str = "kinoteka_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "kinoteka_cache_miss_total";
pub const METRIC_CACHE_STORE_ERROR: &str = "kinoteka_cache_store_error_total";
pub const METRIC_INDEX_QUERY: &str = "kinoteka_index_query_total";
pub const METRIC_INDEX_ERROR: &str = "kinoteka_index_error_total";
