//! Movie handlers.

use crate::auth::Claims;
use crate::errors::CastingError;
use crate::handlers::{parse_body, resource_id};
use crate::models::{CreateMovieRequest, MovieResponse, MoviesResponse, UpdateMovieRequest};
use crate::routes::AppState;
use axum::body::Bytes;
use axum::extract::{rejection::PathRejection, Path, State};
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /movies
#[instrument(skip_all, name = "casting.handlers.list_movies")]
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<MoviesResponse>, CastingError> {
    let movies = state.movies.list().await?;

    tracing::debug!(target: "casting.handlers.movies", count = movies.len(), "Listed movies");

    Ok(Json(MoviesResponse {
        success: true,
        movies,
    }))
}

/// Handler for POST /movies
///
/// Body: `{"title": string?, "release_date": string?}`. Both fields may be
/// omitted.
#[instrument(skip_all, name = "casting.handlers.create_movie")]
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<Json<MovieResponse>, CastingError> {
    let request: CreateMovieRequest = parse_body(&body)?;
    request.validate().map_err(CastingError::Unprocessable)?;

    let movie = state.movies.create(request).await?;

    tracing::info!(
        target: "casting.handlers.movies",
        movie_id = movie.id,
        principal = ?claims,
        "Movie created"
    );

    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

/// Handler for PATCH /movies/{id}
///
/// Fields left out of the body are unchanged; `null` clears a field.
#[instrument(skip_all, name = "casting.handlers.update_movie")]
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i32>, PathRejection>,
    body: Bytes,
) -> Result<Json<MovieResponse>, CastingError> {
    let id = resource_id(path)?;

    if state.movies.get(id).await?.is_none() {
        return Err(CastingError::NotFound);
    }

    let request: UpdateMovieRequest = parse_body(&body)?;
    let changes = request.into_changes().map_err(CastingError::Unprocessable)?;

    let movie = state
        .movies
        .update(id, changes)
        .await?
        .ok_or(CastingError::NotFound)?;

    tracing::info!(
        target: "casting.handlers.movies",
        movie_id = movie.id,
        principal = ?claims,
        "Movie updated"
    );

    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

/// Handler for DELETE /movies/{id}
///
/// Returns the deleted record.
#[instrument(skip_all, name = "casting.handlers.delete_movie")]
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<MovieResponse>, CastingError> {
    let id = resource_id(path)?;

    let movie = state
        .movies
        .delete(id)
        .await?
        .ok_or(CastingError::NotFound)?;

    tracing::info!(
        target: "casting.handlers.movies",
        movie_id = movie.id,
        principal = ?claims,
        "Movie deleted"
    );

    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}
