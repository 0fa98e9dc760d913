//! API handlers organized by resource type.
//!
//! Shared query structs and parameter helpers live here. Page parameters are
//! declared on each struct; `serde(flatten)` does not parse numbers out of
//! url-encoded queries.

mod films;
mod genres;
mod persons;

pub use films::*;
pub use genres::*;
pub use persons::*;

use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::pagination::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::domain::ids::parse_entity_id;

use super::error::ApiError;

/// Query of `GET /films`.
#[derive(Debug, Deserialize)]
pub struct FilmListQuery {
    pub sort: Option<String>,
    #[serde(rename = "filter[genre]")]
    pub genre: Option<String>,
    #[serde(rename = "page[number]")]
    pub page_number: Option<u32>,
    #[serde(rename = "page[size]")]
    pub page_size: Option<u32>,
}

/// Query of the `search` endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(rename = "page[number]")]
    pub page_number: Option<u32>,
    #[serde(rename = "page[size]")]
    pub page_size: Option<u32>,
}

/// Apply the page defaults to the optional `page[number]` / `page[size]` pair.
fn page_or_default(number: Option<u32>, size: Option<u32>) -> (u32, u32) {
    (
        number.unwrap_or(DEFAULT_PAGE_NUMBER),
        size.unwrap_or(DEFAULT_PAGE_SIZE),
    )
}

pub async fn health() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| {
            ApiError::bad_request("Invalid query parameters", Some(rejection.body_text()))
        })
}

fn path_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_entity_id(raw)
        .map_err(|err| ApiError::bad_request("Malformed identifier", Some(err.to_string())))
}
