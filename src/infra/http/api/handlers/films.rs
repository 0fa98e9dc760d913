//! Film handlers

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

use super::{FilmListQuery, SearchQuery, page_or_default, path_id, query_params};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

/// Best-rated first when the client does not ask for an order.
pub const DEFAULT_FILM_SORT: &str = "-imdb_rating";

pub async fn list_films(
    State(state): State<ApiState>,
    query: Result<Query<FilmListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let genre = query.genre.as_deref().map(path_id).transpose()?;
    let (number, size) = page_or_default(query.page_number, query.page_size);
    let sort = query.sort.as_deref().unwrap_or(DEFAULT_FILM_SORT);

    let films = state.films.list(sort, number, size, genre).await?;
    if films.is_empty() {
        return Err(ApiError::not_found("films not found"));
    }
    Ok(Json(films))
}

pub async fn search_films(
    State(state): State<ApiState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let (number, size) = page_or_default(query.page_number, query.page_size);

    let films = state.films.search(&query.query, number, size).await?;
    if films.is_empty() {
        return Err(ApiError::not_found("films not found for this query"));
    }
    Ok(Json(films))
}

pub async fn get_film(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(&id)?;

    match state.films.get_by_id(id).await? {
        Some(film) => Ok(Json(film)),
        None => Err(ApiError::not_found("film not found")),
    }
}
