//! Casting Agency API service library.
//!
//! A REST API over actors and movies. Every resource route is gated by a
//! permission carried in an RS256 bearer token issued by an external
//! identity provider.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/auth.rs -> handlers/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `admin` - Operator database tasks
//! - `auth` - JWKS client, token validation, permission checks
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Permission gate, error envelope, HTTP metrics
//! - `models` - Records, request bodies and response envelopes
//! - `observability` - Prometheus metrics
//! - `repositories` - Storage traits with PostgreSQL and in-memory backends
//! - `routes` - Axum router setup

pub mod admin;
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;

/// Embedded schema migrations, shared by the service and `casting-admin`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Append a `statement_timeout` option to a PostgreSQL connection URL.
pub fn with_statement_timeout(url: &str, timeout_secs: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}options=-c%20statement_timeout%3D{timeout_secs}s")
}
