//! Casting service models.
//!
//! Contains the actor and movie records, request bodies for create and
//! partial update, and the response envelopes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Maximum length of names, genders and titles (matches the column width).
pub const MAX_TEXT_FIELD_LENGTH: usize = 80;

/// Serialized form of `release_date`.
const RELEASE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ============================================================================
// Records
// ============================================================================

/// An actor as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Actor {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// A movie as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    pub title: Option<String>,
    pub release_date: Option<ReleaseDate>,
}

/// Movie release timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` or a bare
/// `YYYY-MM-DD` (midnight). Always serialized as `YYYY-MM-DDTHH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseDate(pub NaiveDateTime);

impl ReleaseDate {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(Self(dt.naive_utc()));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
                return Some(Self(dt));
            }
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self)
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(RELEASE_DATE_FORMAT))
    }
}

impl Serialize for ReleaseDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReleaseDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ReleaseDate::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid release date '{raw}'")))
    }
}

// ============================================================================
// Partial updates
// ============================================================================

/// A field in a partial update.
///
/// Distinguishes a field that was not sent (`Absent`) from one sent as
/// `null` (`Null`). Use with `#[serde(default)]` so missing keys become
/// `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T> Patch<T> {
    /// Change for a NOT NULL column. `Null` is rejected.
    pub fn required(self, field: &'static str) -> Result<Option<T>, String> {
        match self {
            Patch::Absent => Ok(None),
            Patch::Null => Err(format!("{field} cannot be null")),
            Patch::Value(value) => Ok(Some(value)),
        }
    }

    /// Change for a nullable column: `None` leaves it, `Some(None)` clears it.
    pub fn nullable(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(value) => Some(Some(value)),
        }
    }
}

// ============================================================================
// Actor requests
// ============================================================================

/// Body of `POST /actors`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActorRequest {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

impl CreateActorRequest {
    /// Validate the request fields.
    pub fn validate(&self) -> Result<(), String> {
        validate_text("name", &self.name)?;
        validate_age(self.age)?;
        validate_text("gender", &self.gender)
    }
}

/// Body of `PATCH /actors/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateActorRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub age: Patch<i32>,
    #[serde(default)]
    pub gender: Patch<String>,
}

/// Validated changes to an actor. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorChanges {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

impl UpdateActorRequest {
    /// Turn the request into validated changes.
    pub fn into_changes(self) -> Result<ActorChanges, String> {
        let changes = ActorChanges {
            name: self.name.required("name")?,
            age: self.age.required("age")?,
            gender: self.gender.required("gender")?,
        };

        if let Some(name) = &changes.name {
            validate_text("name", name)?;
        }
        if let Some(age) = changes.age {
            validate_age(age)?;
        }
        if let Some(gender) = &changes.gender {
            validate_text("gender", gender)?;
        }

        Ok(changes)
    }
}

impl ActorChanges {
    pub fn apply(&self, actor: &mut Actor) {
        if let Some(name) = &self.name {
            actor.name = name.clone();
        }
        if let Some(age) = self.age {
            actor.age = age;
        }
        if let Some(gender) = &self.gender {
            actor.gender = gender.clone();
        }
    }
}

// ============================================================================
// Movie requests
// ============================================================================

/// Body of `POST /movies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMovieRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<ReleaseDate>,
}

impl CreateMovieRequest {
    /// Validate the request fields.
    pub fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) => validate_text("title", title),
            None => Ok(()),
        }
    }
}

/// Body of `PATCH /movies/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMovieRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub release_date: Patch<ReleaseDate>,
}

/// Validated changes to a movie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieChanges {
    pub title: Option<Option<String>>,
    pub release_date: Option<Option<ReleaseDate>>,
}

impl UpdateMovieRequest {
    /// Turn the request into validated changes.
    pub fn into_changes(self) -> Result<MovieChanges, String> {
        let changes = MovieChanges {
            title: self.title.nullable(),
            release_date: self.release_date.nullable(),
        };

        if let Some(Some(title)) = &changes.title {
            validate_text("title", title)?;
        }

        Ok(changes)
    }
}

impl MovieChanges {
    pub fn apply(&self, movie: &mut Movie) {
        if let Some(title) = &self.title {
            movie.title = title.clone();
        }
        if let Some(release_date) = self.release_date {
            movie.release_date = release_date;
        }
    }
}

fn validate_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be blank"));
    }
    if value.chars().count() > MAX_TEXT_FIELD_LENGTH {
        return Err(format!(
            "{field} must be at most {MAX_TEXT_FIELD_LENGTH} characters"
        ));
    }
    Ok(())
}

fn validate_age(age: i32) -> Result<(), String> {
    if age < 0 {
        return Err("age must not be negative".to_string());
    }
    Ok(())
}

// ============================================================================
// Responses
// ============================================================================

/// Response for `GET /actors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorsResponse {
    pub success: bool,
    pub actors: Vec<Actor>,
}

/// Response for single-actor operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorResponse {
    pub success: bool,
    pub actor: Actor,
}

/// Response for `GET /movies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviesResponse {
    pub success: bool,
    pub movies: Vec<Movie>,
}

/// Response for single-movie operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieResponse {
    pub success: bool,
    pub movie: Movie,
}

/// Readiness check response.
///
/// Returned by the `/ready` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Database connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,

    /// Whether a JWKS endpoint is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks: Option<&'static str>,

    /// Error message (generic, no infrastructure details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
