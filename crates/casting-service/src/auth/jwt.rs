//! JWT validation for the casting service.
//!
//! Validates incoming JWTs using public keys fetched from the identity
//! provider's JWKS endpoint.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only RS256 is accepted, whatever the token header claims
//! - Issuer, audience and expiry are always validated

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::config::Config;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::instrument;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens larger than this are rejected before any base64 decoding or
/// signature work.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// JWT validator using the provider's JWKS.
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,

    /// Expected `iss` claim.
    issuer: String,

    /// Expected `aud` claim.
    audience: String,

    /// Leeway in seconds for `exp` validation.
    leeway_seconds: u64,
}

impl JwtValidator {
    /// Create a new JWT validator.
    ///
    /// # Arguments
    ///
    /// * `jwks_client` - Client for fetching public keys
    /// * `issuer` - Expected issuer URL
    /// * `audience` - Expected API audience
    /// * `leeway_seconds` - Clock tolerance for expiry
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway_seconds,
        }
    }

    /// Build a validator and its JWKS client from service configuration.
    pub fn from_config(config: &Config) -> Self {
        let jwks_client = Arc::new(JwksClient::new(
            config.jwks_url.clone(),
            config.jwks_cache_ttl,
            config.jwks_fetch_timeout,
        ));

        Self::new(
            jwks_client,
            config.auth_issuer.clone(),
            config.api_audience.clone(),
            config.jwt_leeway_seconds,
        )
    }

    /// Validate a JWT and return the claims.
    ///
    /// # Checks
    ///
    /// 1. Size check - reject tokens > 8KB before parsing
    /// 2. Extract kid from the unverified header
    /// 3. Fetch the public key from the JWKS
    /// 4. Verify the RS256 signature
    /// 5. Validate `iss` and `aud`
    /// 6. Validate `exp`
    #[instrument(skip_all, name = "casting.auth.jwt.validate")]
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let kid = extract_kid(token)?;

        let jwk = self.jwks_client.get_key(&kid).await?;

        let claims = verify_token(
            token,
            &jwk,
            &self.issuer,
            &self.audience,
            self.leeway_seconds,
        )?;

        tracing::debug!(target: "casting.auth.jwt", "Token validated successfully");
        Ok(claims)
    }
}

/// Extract the `kid` from a JWT header without verifying the signature.
///
/// Empty `kid` values are rejected.
pub fn extract_kid(token: &str) -> Result<String, AuthError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "casting.auth.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(AuthError::MalformedToken);
    }

    // JWT format: header.payload.signature
    let mut parts = token.split('.');
    let (Some(header_part), Some(_), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        tracing::debug!(target: "casting.auth.jwt", "Token rejected: invalid JWT format");
        return Err(AuthError::MalformedToken);
    };

    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "casting.auth.jwt", error = %e, "Failed to decode JWT header base64");
        AuthError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "casting.auth.jwt", error = %e, "Failed to parse JWT header JSON");
        AuthError::MalformedToken
    })?;

    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| {
            tracing::debug!(target: "casting.auth.jwt", "Token header has no kid");
            AuthError::MalformedToken
        })
}

/// Build an RS256 decoding key from a JWK.
fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    if jwk.kty != "RSA" {
        tracing::warn!(target: "casting.auth.jwt", kty = %jwk.kty, "Unexpected JWK key type");
        return Err(AuthError::KeyNotFound);
    }
    if let Some(alg) = &jwk.alg {
        if alg != "RS256" {
            tracing::warn!(target: "casting.auth.jwt", alg = %alg, "Unexpected JWK algorithm");
            return Err(AuthError::KeyNotFound);
        }
    }

    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        tracing::error!(target: "casting.auth.jwt", kid = %jwk.kid, "JWK missing RSA components");
        return Err(AuthError::KeyNotFound);
    };

    DecodingKey::from_rsa_components(n, e).map_err(|e| {
        tracing::error!(target: "casting.auth.jwt", error = %e, "Invalid RSA key components");
        AuthError::KeyNotFound
    })
}

/// Verify JWT signature and registered claims, then extract the claim set.
fn verify_token(
    token: &str,
    jwk: &Jwk,
    issuer: &str,
    audience: &str,
    leeway_seconds: u64,
) -> Result<Claims, AuthError> {
    let key = decoding_key(jwk)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);
    validation.set_required_spec_claims(&["exp", "iss", "aud"]);
    validation.validate_exp = true;
    validation.leeway = leeway_seconds;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(target: "casting.auth.jwt", error = %e, "Token verification failed");
        classify(e.kind())
    })?;

    Ok(token_data.claims)
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => AuthError::InvalidClaims,
        // An absent issuer or audience cannot match the expected one
        ErrorKind::MissingRequiredClaim(claim) if claim == "iss" || claim == "aud" => {
            AuthError::InvalidClaims
        }
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::UnparseableToken,
    }
}
