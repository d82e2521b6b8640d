//! Actor handlers.
//!
//! Every handler runs behind a `PermissionGate`, so the `Claims` extension is
//! always present.

use crate::auth::Claims;
use crate::errors::CastingError;
use crate::handlers::{parse_body, resource_id};
use crate::models::{ActorResponse, ActorsResponse, CreateActorRequest, UpdateActorRequest};
use crate::routes::AppState;
use axum::body::Bytes;
use axum::extract::{rejection::PathRejection, Path, State};
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /actors
#[instrument(skip_all, name = "casting.handlers.list_actors")]
pub async fn list_actors(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<ActorsResponse>, CastingError> {
    let actors = state.actors.list().await?;

    tracing::debug!(target: "casting.handlers.actors", count = actors.len(), "Listed actors");

    Ok(Json(ActorsResponse {
        success: true,
        actors,
    }))
}

/// Handler for POST /actors
///
/// Body: `{"name": string, "age": int, "gender": string}`, all required.
#[instrument(skip_all, name = "casting.handlers.create_actor")]
pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<Json<ActorResponse>, CastingError> {
    let request: CreateActorRequest = parse_body(&body)?;
    request.validate().map_err(CastingError::Unprocessable)?;

    let actor = state.actors.create(request).await?;

    tracing::info!(
        target: "casting.handlers.actors",
        actor_id = actor.id,
        principal = ?claims,
        "Actor created"
    );

    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

/// Handler for PATCH /actors/{id}
///
/// Fields left out of the body are unchanged. Idempotent.
#[instrument(skip_all, name = "casting.handlers.update_actor")]
pub async fn update_actor(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i32>, PathRejection>,
    body: Bytes,
) -> Result<Json<ActorResponse>, CastingError> {
    let id = resource_id(path)?;

    if state.actors.get(id).await?.is_none() {
        return Err(CastingError::NotFound);
    }

    let request: UpdateActorRequest = parse_body(&body)?;
    let changes = request.into_changes().map_err(CastingError::Unprocessable)?;

    let actor = state
        .actors
        .update(id, changes)
        .await?
        .ok_or(CastingError::NotFound)?;

    tracing::info!(
        target: "casting.handlers.actors",
        actor_id = actor.id,
        principal = ?claims,
        "Actor updated"
    );

    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

/// Handler for DELETE /actors/{id}
///
/// Returns the deleted record.
#[instrument(skip_all, name = "casting.handlers.delete_actor")]
pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<ActorResponse>, CastingError> {
    let id = resource_id(path)?;

    let actor = state
        .actors
        .delete(id)
        .await?
        .ok_or(CastingError::NotFound)?;

    tracing::info!(
        target: "casting.handlers.actors",
        actor_id = actor.id,
        principal = ?claims,
        "Actor deleted"
    );

    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}
