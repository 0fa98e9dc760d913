//! Genre lookups and the genre join used to build full film projections.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tracing::warn;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::pagination::ResultWindow;
use crate::application::query::{QueryDescriptor, indices};
use crate::cache::CacheAside;
use crate::domain::genres::Genre;

/// Upper bound on a full genre listing.
pub const GENRE_LIST_LIMIT: u64 = 1000;

#[derive(Clone)]
pub struct GenreService {
    executor: Arc<CacheAside>,
    ttl: Duration,
}

impl GenreService {
    pub fn new(executor: Arc<CacheAside>, ttl: Duration) -> Self {
        Self { executor, ttl }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Genre>, ServiceError> {
        let descriptor = QueryDescriptor::point(indices::GENRES, "id", id.to_string());
        let hits = self.executor.resolve::<Genre>(&descriptor, self.ttl).await?;
        Ok(hits.and_then(|hits| hits.into_iter().find(|genre| genre.id == id)))
    }

    /// Every genre, ordered by name.
    pub async fn list(&self) -> Result<Vec<Genre>, ServiceError> {
        let descriptor = QueryDescriptor::listing(
            indices::GENRES,
            None,
            ResultWindow::first(GENRE_LIST_LIMIT),
        );
        let mut genres = self
            .executor
            .resolve::<Genre>(&descriptor, self.ttl)
            .await?
            .unwrap_or_default();
        // `name` is an analyzed field, so ordering happens here rather than in the index.
        genres.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(genres)
    }

    /// Exact-name lookup. The match query is analyzed, so near-misses are filtered out here.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Genre>, ServiceError> {
        let descriptor = QueryDescriptor::point(indices::GENRES, "name", name);
        let hits = self.executor.resolve::<Genre>(&descriptor, self.ttl).await?;
        Ok(hits.and_then(|hits| hits.into_iter().find(|genre| genre.name == name)))
    }

    /// Reverse lookup used to turn a genre filter id into the name films are indexed by.
    pub async fn name_for_id(&self, id: Uuid) -> Result<Option<String>, ServiceError> {
        Ok(self.get_by_id(id).await?.map(|genre| genre.name))
    }

    /// Resolve genre names to genres, one-to-one and in input order.
    ///
    /// Each distinct name is looked up once and lookups run concurrently. A name
    /// the genre index does not know fails the whole resolution.
    pub async fn resolve_names(&self, names: &[String]) -> Result<Vec<Genre>, ServiceError> {
        let mut distinct: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            if !distinct.contains(&name.as_str()) {
                distinct.push(name.as_str());
            }
        }

        let lookups = distinct.iter().map(|name| async move {
            match self.find_by_name(name).await? {
                Some(genre) => Ok(genre),
                None => {
                    warn!(genre = %name, "film references a genre missing from the genre index");
                    Err(ServiceError::data_integrity(format!(
                        "genre `{name}` is referenced but not indexed"
                    )))
                }
            }
        });
        let resolved = try_join_all(lookups).await?;

        let by_name: HashMap<&str, Genre> = distinct.into_iter().zip(resolved).collect();
        Ok(names
            .iter()
            .filter_map(|name| by_name.get(name.as_str()).cloned())
            .collect())
    }
}
