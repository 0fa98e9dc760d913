//! Cache-aside execution of query descriptors.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::application::error::ServiceError;
use crate::application::query::{NativeRequest, QueryDescriptor};
use crate::application::repos::{IndexError, RawDocument, SearchIndex};

use super::config::CacheConfig;
use super::store::{CacheStore, ObjectCache};
use super::{METRIC_CACHE_HIT, METRIC_CACHE_MISS, METRIC_INDEX_ERROR, METRIC_INDEX_QUERY};

/// Runs descriptors against the index with a cache in front.
///
/// Only non-empty results are cached. Empty results and missing indices or
/// documents come back as `Ok(None)` and are asked of the index again next time.
#[derive(Clone)]
pub struct CacheAside {
    index: Arc<dyn SearchIndex>,
    cache: Option<ObjectCache>,
}

impl CacheAside {
    pub fn new(index: Arc<dyn SearchIndex>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            index,
            cache: Some(ObjectCache::new(store)),
        }
    }

    /// Executor that always goes to the index.
    pub fn uncached(index: Arc<dyn SearchIndex>) -> Self {
        Self { index, cache: None }
    }

    pub fn from_config(
        index: Arc<dyn SearchIndex>,
        store: Arc<dyn CacheStore>,
        config: &CacheConfig,
    ) -> Self {
        if config.enabled {
            Self::new(index, store)
        } else {
            Self::uncached(index)
        }
    }

    pub async fn resolve<T>(
        &self,
        descriptor: &QueryDescriptor,
        ttl: Duration,
    ) -> Result<Option<Vec<T>>, ServiceError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let index = descriptor.index();
        let key = descriptor.cache_key();

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get::<Vec<T>>(&key).await {
                counter!(METRIC_CACHE_HIT, "index" => index).increment(1);
                debug!(index, key = %key, "cache hit");
                return Ok(Some(hit));
            }
            counter!(METRIC_CACHE_MISS, "index" => index).increment(1);
            debug!(index, key = %key, "cache miss");
        }

        let documents = match self.execute(descriptor).await {
            Ok(documents) => documents,
            Err(err) if err.is_not_found() => {
                debug!(index, error = %err, "index reports resource missing");
                return Ok(None);
            }
            Err(err) => {
                counter!(METRIC_INDEX_ERROR, "index" => index).increment(1);
                return Err(err.into());
            }
        };

        if documents.is_empty() {
            return Ok(None);
        }

        let decoded = documents
            .into_iter()
            .map(|document| serde_json::from_value::<T>(Value::Object(document)))
            .collect::<Result<Vec<T>, _>>()
            .map_err(|err| {
                ServiceError::data_integrity(format!("malformed document in `{index}`: {err}"))
            })?;

        if let Some(cache) = &self.cache {
            cache.set(&key, &decoded, ttl).await;
        }

        Ok(Some(decoded))
    }

    /// Point-lookup form of [`resolve`](Self::resolve): the first hit, if any.
    pub async fn resolve_one<T>(
        &self,
        descriptor: &QueryDescriptor,
        ttl: Duration,
    ) -> Result<Option<T>, ServiceError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let documents = self.resolve::<T>(descriptor, ttl).await?;
        Ok(documents.and_then(|documents| documents.into_iter().next()))
    }

    async fn execute(&self, descriptor: &QueryDescriptor) -> Result<Vec<RawDocument>, IndexError> {
        let index = descriptor.index();
        counter!(METRIC_INDEX_QUERY, "index" => index).increment(1);

        match descriptor.to_native() {
            NativeRequest::Get { id } => Ok(self.index.get(index, &id).await?.into_iter().collect()),
            NativeRequest::Search { body } => self.index.search(index, &body).await,
        }
    }
}
