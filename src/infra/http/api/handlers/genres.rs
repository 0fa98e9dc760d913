//! Genre handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use super::path_id;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

/// An empty catalogue lists as `[]` rather than 404.
pub async fn list_genres(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let genres = state.genres.list().await?;
    Ok(Json(genres))
}

pub async fn get_genre(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(&id)?;

    match state.genres.get_by_id(id).await? {
        Some(genre) => Ok(Json(genre)),
        None => Err(ApiError::not_found("genre not found")),
    }
}
