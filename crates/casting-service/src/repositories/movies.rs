//! PostgreSQL storage for movies.

use crate::errors::CastingError;
use crate::models::{CreateMovieRequest, Movie, MovieChanges, ReleaseDate};
use crate::repositories::MoviesRepository;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use tracing::instrument;

const MOVIE_COLUMNS: &str = "id, title, release_date";

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: i32,
    title: Option<String>,
    release_date: Option<NaiveDateTime>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            release_date: row.release_date.map(ReleaseDate),
        }
    }
}

/// Movies repository over a `PgPool`.
#[derive(Clone)]
pub struct PgMoviesRepository {
    pool: PgPool,
}

impl PgMoviesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MoviesRepository for PgMoviesRepository {
    #[instrument(skip_all, name = "casting.repo.movies.list")]
    async fn list(&self) -> Result<Vec<Movie>, CastingError> {
        let rows: Vec<MovieRow> =
            sqlx::query_as(&format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    #[instrument(skip_all, name = "casting.repo.movies.get", fields(movie_id = id))]
    async fn get(&self, id: i32) -> Result<Option<Movie>, CastingError> {
        let row: Option<MovieRow> =
            sqlx::query_as(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Movie::from))
    }

    #[instrument(skip_all, name = "casting.repo.movies.create")]
    async fn create(&self, movie: CreateMovieRequest) -> Result<Movie, CastingError> {
        let row: MovieRow = sqlx::query_as(&format!(
            "INSERT INTO movies (title, release_date) VALUES ($1, $2) RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(movie.title)
        .bind(movie.release_date.map(|date| date.0))
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(target: "casting.repo.movies", movie_id = row.id, "Movie inserted");

        Ok(row.into())
    }

    /// Nullable columns take a "set" flag and a value so that `NULL` can be
    /// written explicitly.
    #[instrument(skip_all, name = "casting.repo.movies.update", fields(movie_id = id))]
    async fn update(&self, id: i32, changes: MovieChanges) -> Result<Option<Movie>, CastingError> {
        let (set_title, title) = match changes.title {
            Some(title) => (true, title),
            None => (false, None),
        };
        let (set_release_date, release_date) = match changes.release_date {
            Some(date) => (true, date.map(|d| d.0)),
            None => (false, None),
        };

        let row: Option<MovieRow> = sqlx::query_as(&format!(
            r#"
            UPDATE movies SET
                title = CASE WHEN $2 THEN $3 ELSE title END,
                release_date = CASE WHEN $4 THEN $5 ELSE release_date END
            WHERE id = $1
            RETURNING {MOVIE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(set_title)
        .bind(title)
        .bind(set_release_date)
        .bind(release_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Movie::from))
    }

    #[instrument(skip_all, name = "casting.repo.movies.delete", fields(movie_id = id))]
    async fn delete(&self, id: i32) -> Result<Option<Movie>, CastingError> {
        let row: Option<MovieRow> = sqlx::query_as(&format!(
            "DELETE FROM movies WHERE id = $1 RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Movie::from))
    }
}
