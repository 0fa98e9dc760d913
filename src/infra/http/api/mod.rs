pub mod error;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::infra::http::middleware::{log_responses, set_request_context};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/films", get(handlers::list_films))
        .route("/api/v1/films/search", get(handlers::search_films))
        .route("/api/v1/films/{id}", get(handlers::get_film))
        .route("/api/v1/genres", get(handlers::list_genres))
        .route("/api/v1/genres/{id}", get(handlers::get_genre))
        .route("/api/v1/persons/search", get(handlers::search_persons))
        .route("/api/v1/persons/{id}", get(handlers::get_person))
        .route("/api/v1/persons/{id}/film", get(handlers::get_person_films))
        .route("/api/v1/health", get(handlers::health))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
