//! Person handlers

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

use super::{SearchQuery, page_or_default, path_id, query_params};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

pub async fn search_persons(
    State(state): State<ApiState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let (number, size) = page_or_default(query.page_number, query.page_size);

    let persons = state.persons.search(&query.query, number, size).await?;
    if persons.is_empty() {
        return Err(ApiError::not_found("persons not found for this query"));
    }
    Ok(Json(persons))
}

pub async fn get_person(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(&id)?;

    match state.persons.get_by_id(id).await? {
        Some(person) => Ok(Json(person)),
        None => Err(ApiError::not_found("person not found")),
    }
}

pub async fn get_person_films(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(&id)?;

    match state.persons.films(id).await? {
        Some(films) if !films.is_empty() => Ok(Json(films)),
        _ => Err(ApiError::not_found("person not found")),
    }
}
