//! In-memory repositories.
//!
//! Mirror the PostgreSQL tables closely enough for handler and router tests:
//! ids are assigned from a sequence starting at 1 and never reused, actor
//! names are unique, and non-null movie titles are unique.

use crate::errors::CastingError;
use crate::models::{
    Actor, ActorChanges, CreateActorRequest, CreateMovieRequest, Movie, MovieChanges,
};
use crate::repositories::{ActorsRepository, DatabaseHealth, MoviesRepository};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

struct Table<T> {
    next_id: i32,
    rows: BTreeMap<i32, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct InMemoryActorsRepository {
    table: RwLock<Table<Actor>>,
}

impl InMemoryActorsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(table: &Table<Actor>, name: &str, except: Option<i32>) -> bool {
    table
        .rows
        .values()
        .any(|actor| actor.name == name && Some(actor.id) != except)
}

#[async_trait]
impl ActorsRepository for InMemoryActorsRepository {
    async fn list(&self) -> Result<Vec<Actor>, CastingError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Actor>, CastingError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, actor: CreateActorRequest) -> Result<Actor, CastingError> {
        let mut table = self.table.write().await;

        if name_taken(&table, &actor.name, None) {
            return Err(CastingError::Conflict("actors_name_key".to_string()));
        }

        let created = Actor {
            id: table.allocate_id(),
            name: actor.name,
            age: actor.age,
            gender: actor.gender,
        };
        table.rows.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update(&self, id: i32, changes: ActorChanges) -> Result<Option<Actor>, CastingError> {
        let mut table = self.table.write().await;

        if let Some(name) = &changes.name {
            if name_taken(&table, name, Some(id)) {
                return Err(CastingError::Conflict("actors_name_key".to_string()));
            }
        }

        Ok(table.rows.get_mut(&id).map(|actor| {
            changes.apply(actor);
            actor.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<Option<Actor>, CastingError> {
        Ok(self.table.write().await.rows.remove(&id))
    }
}

#[derive(Default)]
pub struct InMemoryMoviesRepository {
    table: RwLock<Table<Movie>>,
}

impl InMemoryMoviesRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn title_taken(table: &Table<Movie>, title: &str, except: Option<i32>) -> bool {
    table
        .rows
        .values()
        .any(|movie| movie.title.as_deref() == Some(title) && Some(movie.id) != except)
}

#[async_trait]
impl MoviesRepository for InMemoryMoviesRepository {
    async fn list(&self) -> Result<Vec<Movie>, CastingError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Movie>, CastingError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, movie: CreateMovieRequest) -> Result<Movie, CastingError> {
        let mut table = self.table.write().await;

        if let Some(title) = &movie.title {
            if title_taken(&table, title, None) {
                return Err(CastingError::Conflict("movies_title_key".to_string()));
            }
        }

        let created = Movie {
            id: table.allocate_id(),
            title: movie.title,
            release_date: movie.release_date,
        };
        table.rows.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update(&self, id: i32, changes: MovieChanges) -> Result<Option<Movie>, CastingError> {
        let mut table = self.table.write().await;

        if let Some(Some(title)) = &changes.title {
            if title_taken(&table, title, Some(id)) {
                return Err(CastingError::Conflict("movies_title_key".to_string()));
            }
        }

        Ok(table.rows.get_mut(&id).map(|movie| {
            changes.apply(movie);
            movie.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<Option<Movie>, CastingError> {
        Ok(self.table.write().await.rows.remove(&id))
    }
}

/// Readiness probe with a switchable outcome.
pub struct InMemoryDatabaseHealth {
    healthy: AtomicBool,
}

impl InMemoryDatabaseHealth {
    pub fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

impl Default for InMemoryDatabaseHealth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseHealth for InMemoryDatabaseHealth {
    async fn ping(&self) -> Result<(), CastingError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CastingError::Database("connection refused".to_string()))
        }
    }
}
