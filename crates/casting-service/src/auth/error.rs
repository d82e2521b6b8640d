//! Authorization failure kinds.
//!
//! Every failure in the authorization pipeline is one of these variants.
//! A variant is built where the failure is detected and travels unchanged
//! to the response boundary, where `code()`, `status_code()` and the
//! `Display` text become the error envelope.
//!
//! Status policy: malformed input is 400, lookup and cryptographic
//! rejection is 401.

use thiserror::Error;

/// Reason attached to a malformed `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProblem {
    /// Scheme is not `bearer` (case-insensitive).
    WrongScheme,
    /// Scheme present but no token follows.
    MissingToken,
    /// More than two whitespace-separated parts.
    TooManyParts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingAuthHeader,

    #[error("{}", header_problem_text(.0))]
    MalformedAuthHeader(HeaderProblem),

    /// Token is oversized, not three segments, or carries no `kid`.
    #[error("Authorization malformed.")]
    MalformedToken,

    #[error("Unable to find the appropriate key.")]
    KeyNotFound,

    /// The key set could not be fetched from the identity provider.
    #[error("Unable to fetch signing keys.")]
    KeySetUnavailable,

    #[error("Token signature is invalid.")]
    InvalidSignature,

    #[error("Unable to parse authentication token.")]
    UnparseableToken,

    #[error("Token expired.")]
    TokenExpired,

    /// Issuer or audience mismatch.
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Permissions not included in JWT.")]
    MissingPermissionsClaim,

    #[error("Permission not found.")]
    PermissionDenied,
}

fn header_problem_text(problem: &HeaderProblem) -> &'static str {
    match problem {
        HeaderProblem::WrongScheme => "Authorization header must start with \"Bearer\".",
        HeaderProblem::MissingToken => "Token not found.",
        HeaderProblem::TooManyParts => "Authorization header must be bearer token.",
    }
}

impl AuthError {
    /// Machine-readable error code returned to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "authorization_header_missing",
            AuthError::MalformedAuthHeader(_)
            | AuthError::MalformedToken
            | AuthError::KeyNotFound
            | AuthError::KeySetUnavailable
            | AuthError::UnparseableToken => "invalid_header",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims | AuthError::MissingPermissionsClaim => "invalid_claims",
            AuthError::PermissionDenied => "unauthorized",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MalformedToken
            | AuthError::UnparseableToken
            | AuthError::MissingPermissionsClaim => 400,
            AuthError::MissingAuthHeader
            | AuthError::MalformedAuthHeader(_)
            | AuthError::KeyNotFound
            | AuthError::KeySetUnavailable
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::InvalidClaims
            | AuthError::PermissionDenied => 401,
        }
    }

    /// Human-readable description, identical to the `Display` output.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::MissingAuthHeader.status_code(), 401);
        assert_eq!(
            AuthError::MalformedAuthHeader(HeaderProblem::WrongScheme).status_code(),
            401
        );
        assert_eq!(AuthError::MalformedToken.status_code(), 400);
        assert_eq!(AuthError::KeyNotFound.status_code(), 401);
        assert_eq!(AuthError::KeySetUnavailable.status_code(), 401);
        assert_eq!(AuthError::InvalidSignature.status_code(), 401);
        assert_eq!(AuthError::UnparseableToken.status_code(), 400);
        assert_eq!(AuthError::TokenExpired.status_code(), 401);
        assert_eq!(AuthError::InvalidClaims.status_code(), 401);
        assert_eq!(AuthError::MissingPermissionsClaim.status_code(), 400);
        assert_eq!(AuthError::PermissionDenied.status_code(), 401);
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            AuthError::MissingAuthHeader.code(),
            "authorization_header_missing"
        );
        assert_eq!(AuthError::KeyNotFound.code(), "invalid_header");
        assert_eq!(AuthError::TokenExpired.code(), "token_expired");
        assert_eq!(AuthError::InvalidClaims.code(), "invalid_claims");
        assert_eq!(AuthError::MissingPermissionsClaim.code(), "invalid_claims");
        assert_eq!(AuthError::PermissionDenied.code(), "unauthorized");
    }

    #[test]
    fn test_header_problem_descriptions() {
        assert_eq!(
            AuthError::MalformedAuthHeader(HeaderProblem::WrongScheme).description(),
            "Authorization header must start with \"Bearer\"."
        );
        assert_eq!(
            AuthError::MalformedAuthHeader(HeaderProblem::MissingToken).description(),
            "Token not found."
        );
        assert_eq!(
            AuthError::MalformedAuthHeader(HeaderProblem::TooManyParts).description(),
            "Authorization header must be bearer token."
        );
    }

    #[test]
    fn test_missing_header_description_mentions_header() {
        assert!(AuthError::MissingAuthHeader
            .description()
            .contains("Authorization header"));
    }
}
