//! Authentication and authorization for the casting service.
//!
//! # Components
//!
//! - `jwks` - JWKS client for fetching and caching the provider's public keys
//! - `jwt` - RS256 token validation using the cached keys
//! - `claims` - Claim set produced by a validated token
//! - `permissions` - Permission checks against a claim set
//! - `error` - Failure kinds with their HTTP mapping

pub mod claims;
pub mod error;
pub mod jwks;
pub mod jwt;
pub mod permissions;

pub use claims::{Audience, Claims};
pub use error::{AuthError, HeaderProblem};
pub use jwks::JwksClient;
pub use jwt::JwtValidator;
pub use permissions::check_permission;
