use std::sync::Arc;

use crate::application::films::FilmService;
use crate::application::genres::GenreService;
use crate::application::persons::PersonService;
use crate::cache::{CacheAside, CacheConfig};

#[derive(Clone)]
pub struct ApiState {
    pub films: Arc<FilmService>,
    pub genres: Arc<GenreService>,
    pub persons: Arc<PersonService>,
}

impl ApiState {
    /// Wire the catalogue services over one shared executor.
    pub fn from_executor(executor: Arc<CacheAside>, cache: &CacheConfig) -> Self {
        let genres = Arc::new(GenreService::new(executor.clone(), cache.genre_ttl()));
        let films = Arc::new(FilmService::new(
            executor.clone(),
            genres.clone(),
            cache.film_ttl(),
        ));
        let persons = Arc::new(PersonService::new(
            executor,
            films.clone(),
            cache.person_ttl(),
        ));

        Self {
            films,
            genres,
            persons,
        }
    }
}
