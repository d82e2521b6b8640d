//! PostgreSQL storage for actors.
//!
//! All queries are parameterized. Each mutation is a single statement, so a
//! failed write leaves the table untouched.

use crate::errors::CastingError;
use crate::models::{Actor, ActorChanges, CreateActorRequest};
use crate::repositories::ActorsRepository;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

const ACTOR_COLUMNS: &str = "id, name, age, gender";

/// Actors repository over a `PgPool`.
#[derive(Clone)]
pub struct PgActorsRepository {
    pool: PgPool,
}

impl PgActorsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorsRepository for PgActorsRepository {
    #[instrument(skip_all, name = "casting.repo.actors.list")]
    async fn list(&self) -> Result<Vec<Actor>, CastingError> {
        let actors: Vec<Actor> =
            sqlx::query_as(&format!("SELECT {ACTOR_COLUMNS} FROM actors ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        Ok(actors)
    }

    #[instrument(skip_all, name = "casting.repo.actors.get", fields(actor_id = id))]
    async fn get(&self, id: i32) -> Result<Option<Actor>, CastingError> {
        let actor: Option<Actor> =
            sqlx::query_as(&format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(actor)
    }

    #[instrument(skip_all, name = "casting.repo.actors.create")]
    async fn create(&self, actor: CreateActorRequest) -> Result<Actor, CastingError> {
        let created: Actor = sqlx::query_as(&format!(
            "INSERT INTO actors (name, age, gender) VALUES ($1, $2, $3) RETURNING {ACTOR_COLUMNS}"
        ))
        .bind(&actor.name)
        .bind(actor.age)
        .bind(&actor.gender)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(target: "casting.repo.actors", actor_id = created.id, "Actor inserted");

        Ok(created)
    }

    #[instrument(skip_all, name = "casting.repo.actors.update", fields(actor_id = id))]
    async fn update(&self, id: i32, changes: ActorChanges) -> Result<Option<Actor>, CastingError> {
        let updated: Option<Actor> = sqlx::query_as(&format!(
            r#"
            UPDATE actors SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender)
            WHERE id = $1
            RETURNING {ACTOR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.age)
        .bind(changes.gender)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    #[instrument(skip_all, name = "casting.repo.actors.delete", fields(actor_id = id))]
    async fn delete(&self, id: i32) -> Result<Option<Actor>, CastingError> {
        let deleted: Option<Actor> = sqlx::query_as(&format!(
            "DELETE FROM actors WHERE id = $1 RETURNING {ACTOR_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }
}
