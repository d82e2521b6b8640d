//! Middleware for the casting service.
//!
//! # Components
//!
//! - `auth` - Per-route permission gate
//! - `envelope` - JSON envelope for framework-generated errors
//! - `http_metrics` - HTTP request metrics

pub mod auth;
pub mod envelope;
pub mod http_metrics;

pub use auth::{extract_bearer_token, require_permission, PermissionGate};
pub use envelope::error_envelope;
pub use http_metrics::http_metrics_middleware;
