use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::films::FilmService;
use crate::application::pagination::PageRequest;
use crate::application::query::{QueryDescriptor, indices};
use crate::cache::CacheAside;
use crate::domain::films::FilmSummary;
use crate::domain::persons::Person;

const SEARCH_FIELDS: &[&str] = &["full_name"];

#[derive(Clone)]
pub struct PersonService {
    executor: Arc<CacheAside>,
    films: Arc<FilmService>,
    ttl: Duration,
}

impl PersonService {
    pub fn new(executor: Arc<CacheAside>, films: Arc<FilmService>, ttl: Duration) -> Self {
        Self {
            executor,
            films,
            ttl,
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Person>, ServiceError> {
        let descriptor = QueryDescriptor::by_id(indices::PERSONS, id);
        self.executor.resolve_one::<Person>(&descriptor, self.ttl).await
    }

    pub async fn search(
        &self,
        text: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<Vec<Person>, ServiceError> {
        let page = PageRequest::new(page_number, page_size)?;
        let descriptor =
            QueryDescriptor::search(indices::PERSONS, text, SEARCH_FIELDS, page.window())?;
        Ok(self
            .executor
            .resolve::<Person>(&descriptor, self.ttl)
            .await?
            .unwrap_or_default())
    }

    /// Films the person worked on, or `None` when the person is unknown.
    pub async fn films(&self, id: Uuid) -> Result<Option<Vec<FilmSummary>>, ServiceError> {
        let Some(person) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let films = self.films.get_summaries(&person.film_ids).await?;
        Ok(Some(films))
    }
}
