//! Permission gate for protected routes.
//!
//! Each protected (path, method) pair gets its own `PermissionGate` naming the
//! permission it requires. The gate extracts the bearer token, validates it,
//! checks the permission and hands the `Claims` to the handler through the
//! request extensions.

use crate::auth::{check_permission, AuthError, Claims, HeaderProblem, JwtValidator};
use crate::errors::CastingError;
use crate::observability::metrics::record_authorization;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// State for one permission-gated route.
#[derive(Clone)]
pub struct PermissionGate {
    pub validator: Arc<JwtValidator>,
    pub permission: &'static str,
}

impl PermissionGate {
    pub fn new(validator: Arc<JwtValidator>, permission: &'static str) -> Self {
        Self {
            validator,
            permission,
        }
    }
}

/// Extract the bearer token from the `Authorization` header.
///
/// The header is split on whitespace: the first part must be `bearer`
/// (any case) and exactly one token must follow.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| {
            tracing::debug!(target: "casting.middleware.auth", "Missing Authorization header");
            AuthError::MissingAuthHeader
        })?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next().unwrap_or_default();

    if !scheme.eq_ignore_ascii_case("bearer") {
        tracing::debug!(target: "casting.middleware.auth", "Authorization scheme is not Bearer");
        return Err(AuthError::MalformedAuthHeader(HeaderProblem::WrongScheme));
    }

    let token = parts.next().ok_or_else(|| {
        tracing::debug!(target: "casting.middleware.auth", "Bearer scheme without token");
        AuthError::MalformedAuthHeader(HeaderProblem::MissingToken)
    })?;

    if parts.next().is_some() {
        tracing::debug!(target: "casting.middleware.auth", "Authorization header has extra parts");
        return Err(AuthError::MalformedAuthHeader(HeaderProblem::TooManyParts));
    }

    Ok(token)
}

async fn authorize(gate: &PermissionGate, headers: &HeaderMap) -> Result<Claims, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = gate.validator.validate(token).await?;
    check_permission(gate.permission, &claims)?;
    Ok(claims)
}

/// Authorization middleware.
///
/// # Response
///
/// - Short-circuits with the `AuthError` envelope when the header, token or
///   permission is rejected
/// - Continues to the handler with `Claims` in extensions otherwise
#[instrument(skip_all, name = "casting.middleware.auth")]
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, CastingError> {
    let claims = match authorize(&gate, req.headers()).await {
        Ok(claims) => claims,
        Err(err) => {
            record_authorization(gate.permission, err.code());
            return Err(err.into());
        }
    };

    record_authorization(gate.permission, "granted");
    tracing::debug!(
        target: "casting.middleware.auth",
        permission = gate.permission,
        "Request authorized"
    );

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_permission_gate_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<PermissionGate>();
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            extract_bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        );
    }

    #[test]
    fn test_blank_header_counts_as_missing() {
        assert_eq!(
            extract_bearer_token(&headers_with("   ")),
            Err(AuthError::MissingAuthHeader)
        );
    }

    #[test]
    fn test_non_ascii_header_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert_eq!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingAuthHeader)
        );
    }

    #[test]
    fn test_valid_header_yields_token() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&headers_with("bearer tok")), Ok("tok"));
        assert_eq!(extract_bearer_token(&headers_with("BEARER tok")), Ok("tok"));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(extract_bearer_token(&headers_with("  Bearer   tok  ")), Ok("tok"));
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(
            extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::MalformedAuthHeader(HeaderProblem::WrongScheme))
        );
        assert_eq!(
            extract_bearer_token(&headers_with("Bearertoken")),
            Err(AuthError::MalformedAuthHeader(HeaderProblem::WrongScheme))
        );
    }

    #[test]
    fn test_scheme_without_token() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer")),
            Err(AuthError::MalformedAuthHeader(HeaderProblem::MissingToken))
        );
    }

    #[test]
    fn test_too_many_parts() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer one two")),
            Err(AuthError::MalformedAuthHeader(HeaderProblem::TooManyParts))
        );
    }
}
