//! HTTP request handlers for the casting service.

pub mod actors;
pub mod health;
pub mod metrics;
pub mod movies;

use crate::errors::CastingError;
use axum::body::Bytes;
use axum::extract::{rejection::PathRejection, Path};
use serde::de::DeserializeOwned;

pub use actors::{create_actor, delete_actor, list_actors, update_actor};
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use movies::{create_movie, delete_movie, list_movies, update_movie};

/// Fallback for unrouted paths.
pub async fn not_found() -> CastingError {
    CastingError::NotFound
}

/// Resolve a `{id}` path segment. Anything that is not an integer names no
/// resource.
fn resource_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, CastingError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!(target: "casting.handlers", error = %rejection, "Unusable resource id");
        CastingError::NotFound
    })
}

/// Parse a JSON request body. Any failure is unprocessable.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, CastingError> {
    serde_json::from_slice(body).map_err(|e| CastingError::Unprocessable(e.to_string()))
}
