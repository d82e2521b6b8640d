//! Permission checks against a verified claim set.

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;

/// Require `permission` to be granted by `claims`.
///
/// Matching is exact and case-sensitive.
pub fn check_permission(permission: &str, claims: &Claims) -> Result<(), AuthError> {
    let Some(granted) = claims.permissions.as_ref() else {
        tracing::debug!(target: "casting.auth.permissions", "Token carries no permissions claim");
        return Err(AuthError::MissingPermissionsClaim);
    };

    if !granted.iter().any(|p| p == permission) {
        tracing::debug!(
            target: "casting.auth.permissions",
            required = %permission,
            "Permission not granted"
        );
        return Err(AuthError::PermissionDenied);
    }

    Ok(())
}
