//! Cache store port and the serializing adapter in front of it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::METRIC_CACHE_STORE_ERROR;

#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
    #[error("cache command failed: {0}")]
    Command(String),
}

/// Byte-level key/value store with native expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheStoreError>;
}

/// Typed view over a [`CacheStore`].
///
/// Never fails: an unreachable store, a failed command or an undecodable entry
/// all read as a miss, and failed writes are dropped.
#[derive(Clone)]
pub struct ObjectCache {
    store: Arc<dyn CacheStore>,
}

impl ObjectCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "cache read failed; treating as miss");
                counter!(METRIC_CACHE_STORE_ERROR, "op" => "get").increment(1);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "cached payload could not be decoded; treating as miss");
                counter!(METRIC_CACHE_STORE_ERROR, "op" => "decode").increment(1);
                None
            }
        }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key, error = %err, "payload could not be encoded for caching");
                counter!(METRIC_CACHE_STORE_ERROR, "op" => "encode").increment(1);
                return;
            }
        };

        match self.store.set(key, bytes, ttl).await {
            Ok(()) => debug!(key, ttl_secs = ttl.as_secs(), "cache populated"),
            Err(err) => {
                warn!(key, error = %err, "cache write failed; continuing without caching");
                counter!(METRIC_CACHE_STORE_ERROR, "op" => "set").increment(1);
            }
        }
    }
}
