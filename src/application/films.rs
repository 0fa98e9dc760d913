use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::genres::GenreService;
use crate::application::pagination::PageRequest;
use crate::application::query::{FILM_SORT_FIELDS, QueryDescriptor, SortSpec, TermFilter, indices};
use crate::cache::CacheAside;
use crate::domain::films::{FilmDetail, FilmDocument, FilmSummary};

/// Field holding genre names in film documents.
const GENRE_FIELD: &str = "genre";
const SEARCH_FIELDS: &[&str] = &["title", "description"];

/// Film lookups, listings and search.
///
/// Point lookups cache the indexed [`FilmDocument`] and resolve genres on every
/// call; listings and search cache [`FilmSummary`] pages and never join.
#[derive(Clone)]
pub struct FilmService {
    executor: Arc<CacheAside>,
    genres: Arc<GenreService>,
    ttl: Duration,
}

impl FilmService {
    pub fn new(executor: Arc<CacheAside>, genres: Arc<GenreService>, ttl: Duration) -> Self {
        Self {
            executor,
            genres,
            ttl,
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<FilmDetail>, ServiceError> {
        let Some(document) = self.document(id).await? else {
            return Ok(None);
        };

        let genres = self.genres.resolve_names(document.genre_names()).await?;
        Ok(Some(FilmDetail::assemble(document, genres)?))
    }

    /// One page of films ordered by `sort`, optionally restricted to a genre id.
    ///
    /// An unknown genre id yields an empty page.
    pub async fn list(
        &self,
        sort: &str,
        page_number: u32,
        page_size: u32,
        genre: Option<Uuid>,
    ) -> Result<Vec<FilmSummary>, ServiceError> {
        let page = PageRequest::new(page_number, page_size)?;
        let sort = SortSpec::parse(&FILM_SORT_FIELDS, sort)?;

        let descriptor = match genre {
            None => QueryDescriptor::listing(indices::FILMS, Some(sort), page.window()),
            Some(genre_id) => {
                let Some(name) = self.genres.name_for_id(genre_id).await? else {
                    return Ok(Vec::new());
                };
                QueryDescriptor::filtered(
                    indices::FILMS,
                    Some(sort),
                    page.window(),
                    TermFilter {
                        field: GENRE_FIELD,
                        value: name,
                    },
                )
            }
        };

        self.summaries(&descriptor).await
    }

    pub async fn search(
        &self,
        text: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<Vec<FilmSummary>, ServiceError> {
        let page = PageRequest::new(page_number, page_size)?;
        let descriptor =
            QueryDescriptor::search(indices::FILMS, text, SEARCH_FIELDS, page.window())?;
        self.summaries(&descriptor).await
    }

    /// Summaries for known film ids, in the given order. A missing id is an integrity error.
    pub async fn get_summaries(&self, ids: &[Uuid]) -> Result<Vec<FilmSummary>, ServiceError> {
        let lookups = ids.iter().map(|id| async move {
            match self.document(*id).await? {
                Some(document) => Ok(document.summary),
                None => Err(ServiceError::data_integrity(format!(
                    "film {id} is referenced but not indexed"
                ))),
            }
        });
        try_join_all(lookups).await
    }

    // Point lookups always cache the full document so every reader of this key
    // decodes the same shape.
    async fn document(&self, id: Uuid) -> Result<Option<FilmDocument>, ServiceError> {
        let descriptor = QueryDescriptor::by_id(indices::FILMS, id);
        self.executor
            .resolve_one::<FilmDocument>(&descriptor, self.ttl)
            .await
    }

    async fn summaries(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<FilmSummary>, ServiceError> {
        Ok(self
            .executor
            .resolve::<FilmSummary>(descriptor, self.ttl)
            .await?
            .unwrap_or_default())
    }
}
