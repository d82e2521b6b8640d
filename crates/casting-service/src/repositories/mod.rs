//! Repository layer for the casting service.
//!
//! Handlers depend on the traits below through `Arc<dyn ...>` in `AppState`.
//! PostgreSQL implementations back the running service; in-memory
//! implementations enforce the same rules and back the integration tests.

pub mod actors;
pub mod memory;
pub mod movies;

use crate::errors::CastingError;
use crate::models::{
    Actor, ActorChanges, CreateActorRequest, CreateMovieRequest, Movie, MovieChanges,
};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

pub use actors::PgActorsRepository;
pub use memory::{InMemoryActorsRepository, InMemoryDatabaseHealth, InMemoryMoviesRepository};
pub use movies::PgMoviesRepository;

/// Storage for actors.
///
/// `get`, `update` and `delete` return `Ok(None)` when no actor has the id.
#[async_trait]
pub trait ActorsRepository: Send + Sync {
    /// All actors ordered by id.
    async fn list(&self) -> Result<Vec<Actor>, CastingError>;

    async fn get(&self, id: i32) -> Result<Option<Actor>, CastingError>;

    /// Insert a validated actor and return it with its assigned id.
    async fn create(&self, actor: CreateActorRequest) -> Result<Actor, CastingError>;

    async fn update(&self, id: i32, changes: ActorChanges) -> Result<Option<Actor>, CastingError>;

    async fn delete(&self, id: i32) -> Result<Option<Actor>, CastingError>;
}

/// Storage for movies.
///
/// `get`, `update` and `delete` return `Ok(None)` when no movie has the id.
#[async_trait]
pub trait MoviesRepository: Send + Sync {
    /// All movies ordered by id.
    async fn list(&self) -> Result<Vec<Movie>, CastingError>;

    async fn get(&self, id: i32) -> Result<Option<Movie>, CastingError>;

    /// Insert a validated movie and return it with its assigned id.
    async fn create(&self, movie: CreateMovieRequest) -> Result<Movie, CastingError>;

    async fn update(&self, id: i32, changes: MovieChanges) -> Result<Option<Movie>, CastingError>;

    async fn delete(&self, id: i32) -> Result<Option<Movie>, CastingError>;
}

/// Connectivity probe used by the readiness endpoint.
#[async_trait]
pub trait DatabaseHealth: Send + Sync {
    async fn ping(&self) -> Result<(), CastingError>;
}

/// Readiness probe backed by the connection pool.
#[derive(Clone)]
pub struct PgDatabaseHealth {
    pool: PgPool,
}

impl PgDatabaseHealth {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseHealth for PgDatabaseHealth {
    #[instrument(skip_all, name = "casting.repo.ping")]
    async fn ping(&self) -> Result<(), CastingError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
