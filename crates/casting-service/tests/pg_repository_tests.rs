//! PostgreSQL repository tests.
//!
//! Require a database: run with `DATABASE_URL=... cargo test -- --ignored`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use casting_service::errors::CastingError;
use casting_service::models::{
    ActorChanges, CreateActorRequest, CreateMovieRequest, MovieChanges, ReleaseDate,
};
use casting_service::repositories::{
    ActorsRepository, DatabaseHealth, MoviesRepository, PgActorsRepository, PgDatabaseHealth,
    PgMoviesRepository,
};
use sqlx::PgPool;

fn titi() -> CreateActorRequest {
    CreateActorRequest {
        name: "Titi".to_string(),
        age: 40,
        gender: "Male".to_string(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_actor_crud(pool: PgPool) {
    let repo = PgActorsRepository::new(pool);

    let created = repo.create(titi()).await.unwrap();
    assert_eq!(created.name, "Titi");
    assert_eq!(repo.list().await.unwrap(), vec![created.clone()]);

    let changes = ActorChanges {
        age: Some(41),
        ..Default::default()
    };
    let updated = repo.update(created.id, changes).await.unwrap().unwrap();
    assert_eq!(updated.age, 41);
    assert_eq!(updated.name, "Titi");

    let deleted = repo.delete(created.id).await.unwrap().unwrap();
    assert_eq!(deleted, updated);
    assert!(repo.get(created.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_missing_actor_returns_none(pool: PgPool) {
    let repo = PgActorsRepository::new(pool);

    assert!(repo.update(2000, ActorChanges::default()).await.unwrap().is_none());
    assert!(repo.delete(2000).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_actor_name_is_conflict(pool: PgPool) {
    let repo = PgActorsRepository::new(pool);
    repo.create(titi()).await.unwrap();

    let result = repo.create(titi()).await;

    assert!(matches!(result, Err(CastingError::Conflict(_))));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_movie_update_sets_and_clears(pool: PgPool) {
    let repo = PgMoviesRepository::new(pool);
    let created = repo
        .create(CreateMovieRequest {
            title: Some("Heat".to_string()),
            release_date: ReleaseDate::parse("1995-12-15"),
        })
        .await
        .unwrap();

    let cleared = repo
        .update(
            created.id,
            MovieChanges {
                title: None,
                release_date: Some(None),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.title.as_deref(), Some("Heat"));
    assert!(cleared.release_date.is_none());

    let retitled = repo
        .update(
            created.id,
            MovieChanges {
                title: Some(Some("Heat 2".to_string())),
                release_date: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retitled.title.as_deref(), Some("Heat 2"));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_deleting_actor_cascades_cast_rows(pool: PgPool) {
    let actors = PgActorsRepository::new(pool.clone());
    let movies = PgMoviesRepository::new(pool.clone());
    let actor = actors.create(titi()).await.unwrap();
    let movie = movies.create(CreateMovieRequest::default()).await.unwrap();

    sqlx::query("INSERT INTO movie_actors (movie_id, actor_id) VALUES ($1, $2)")
        .bind(movie.id)
        .bind(actor.id)
        .execute(&pool)
        .await
        .unwrap();

    actors.delete(actor.id).await.unwrap();

    let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movie_actors")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_ping(pool: PgPool) {
    assert!(PgDatabaseHealth::new(pool).ping().await.is_ok());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_admin_reset_empties_tables(pool: PgPool) {
    let repo = PgActorsRepository::new(pool.clone());
    repo.create(titi()).await.unwrap();

    casting_service::admin::reset(&pool).await.unwrap();

    assert!(repo.list().await.unwrap().is_empty());
}
