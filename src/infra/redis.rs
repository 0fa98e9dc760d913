//! Redis-backed [`CacheStore`] and the store selection used at startup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use tracing::{info, warn};

use crate::cache::{CacheConfig, CacheStore, CacheStoreError, MemoryCacheStore};
use crate::config::RedisSettings;

use super::error::InfraError;

#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a connection pool. No connection is opened until first use.
    pub fn connect(url: &str, settings: &RedisSettings) -> Result<Self, InfraError> {
        let mut config = Config::from_url(url);
        let mut pool = PoolConfig::new(settings.pool_size);
        pool.timeouts.wait = Some(settings.timeout);
        pool.timeouts.create = Some(settings.timeout);
        pool.timeouts.recycle = Some(settings.timeout);
        config.pool = Some(pool);

        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|err| InfraError::configuration(format!("invalid redis pool: {err}")))?;
        Ok(Self::new(pool))
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, CacheStoreError> {
        self.pool
            .get()
            .await
            .map_err(|err| CacheStoreError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|err| CacheStoreError::Command(err.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheStoreError> {
        // SET EX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|err| CacheStoreError::Command(err.to_string()))
    }
}

/// Pick the cache store for this process.
///
/// Redis is used when configured and reachable; otherwise the bounded
/// in-memory store takes over so the service still starts. A disabled cache
/// never opens a Redis pool.
pub async fn connect_cache_store(
    redis: &RedisSettings,
    cache: &CacheConfig,
) -> Arc<dyn CacheStore> {
    if !cache.enabled {
        info!("result cache disabled");
        return Arc::new(MemoryCacheStore::new(cache));
    }

    let Some(url) = redis.url.as_ref() else {
        info!(capacity = cache.memory_capacity, "redis not configured, using in-memory cache");
        return Arc::new(MemoryCacheStore::new(cache));
    };

    let store = match RedisCacheStore::connect(url.as_str(), redis) {
        Ok(store) => store,
        Err(err) => {
            warn!(error = %err, "failed to create redis pool, falling back to in-memory cache");
            return Arc::new(MemoryCacheStore::new(cache));
        }
    };

    match store.connection().await {
        Ok(_) => {
            info!(url = %url, "connected to redis");
            Arc::new(store)
        }
        Err(err) => {
            warn!(error = %err, "redis unreachable, falling back to in-memory cache");
            Arc::new(MemoryCacheStore::new(cache))
        }
    }
}
