//! JWKS client for fetching and caching the identity provider's public keys.
//!
//! The JWKS (JSON Web Key Set) client fetches public keys from the provider's
//! `/.well-known/jwks.json` endpoint and caches them with a configurable TTL.
//!
//! # Security
//!
//! - Each fetch has an explicit timeout and is never retried
//! - The cached key map is replaced wholesale on refresh, never patched
//! - A zero TTL disables caching so every lookup re-fetches

use crate::auth::error::AuthError;
use crate::observability::metrics;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument;

/// JSON Web Key from the JWKS endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (always "RSA" for RS256).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// RSA modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,

    /// Algorithm (should be "RS256" when present).
    #[serde(default)]
    pub alg: Option<String>,
}

/// JWKS response from the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<Jwk>,
}

type KeyMap = Arc<HashMap<String, Jwk>>;

/// Cached JWKS snapshot with expiry time.
struct CachedJwks {
    keys: KeyMap,
    expires_at: Instant,
}

/// JWKS client for fetching and caching public keys.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    http_client: reqwest::Client,

    cache: RwLock<Option<CachedJwks>>,

    /// Cache TTL duration. Zero disables caching.
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a new JWKS client.
    ///
    /// # Arguments
    ///
    /// * `jwks_url` - URL to the provider's JWKS endpoint
    /// * `cache_ttl` - How long to trust a fetched key set
    /// * `fetch_timeout` - Timeout for each HTTP fetch
    pub fn new(jwks_url: String, cache_ttl: Duration, fetch_timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "casting.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            cache: RwLock::new(None),
            cache_ttl,
        }
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Get a JWK by key ID.
    ///
    /// Serves from the cached snapshot while it is fresh, otherwise fetches
    /// the key set from the provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeySetUnavailable` if the JWKS cannot be fetched.
    /// Returns `AuthError::KeyNotFound` if the key ID is not in the set.
    #[instrument(skip(self), name = "casting.auth.jwks.get_key", fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        if let Some(keys) = self.fresh_snapshot().await {
            return match keys.get(kid) {
                Some(key) => {
                    tracing::debug!(target: "casting.auth.jwks", "JWKS cache hit");
                    Ok(key.clone())
                }
                None => {
                    tracing::debug!(target: "casting.auth.jwks", "Key not found in JWKS cache");
                    Err(AuthError::KeyNotFound)
                }
            };
        }

        // Cache miss or expired - fetch fresh JWKS
        let keys = self.refresh_cache().await?;

        keys.get(kid).cloned().ok_or_else(|| {
            tracing::warn!(target: "casting.auth.jwks", "Key not found in JWKS after refresh");
            AuthError::KeyNotFound
        })
    }

    async fn fresh_snapshot(&self) -> Option<KeyMap> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|cached| cached.expires_at > Instant::now())
            .map(|cached| Arc::clone(&cached.keys))
    }

    /// Fetch the key set and replace the cached snapshot.
    #[instrument(skip(self), name = "casting.auth.jwks.refresh")]
    async fn refresh_cache(&self) -> Result<KeyMap, AuthError> {
        let start = Instant::now();
        let fetched = self.fetch_key_set().await;
        let status = if fetched.is_ok() { "success" } else { "error" };
        metrics::record_jwks_refresh(status, start.elapsed());

        let keys = fetched?;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            keys: Arc::clone(&keys),
            expires_at: Instant::now() + self.cache_ttl,
        });

        Ok(keys)
    }

    async fn fetch_key_set(&self) -> Result<KeyMap, AuthError> {
        tracing::debug!(target: "casting.auth.jwks", url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "casting.auth.jwks", error = %e, "Failed to fetch JWKS");
                AuthError::KeySetUnavailable
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "casting.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::KeySetUnavailable);
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::error!(target: "casting.auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::KeySetUnavailable
        })?;

        let keys: KeyMap = Arc::new(
            jwks.keys
                .into_iter()
                .map(|key| (key.kid.clone(), key))
                .collect(),
        );

        tracing::info!(
            target: "casting.auth.jwks",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        Ok(keys)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn jwks_body() -> serde_json::Value {
        serde_json::json!({
            "keys": [
                {"kty": "RSA", "kid": "key-1", "use": "sig", "n": "AQAB", "e": "AQAB", "alg": "RS256"},
                {"kty": "RSA", "kid": "key-2", "use": "sig", "n": "AQAB", "e": "AQAB"}
            ]
        })
    }

    async fn mock_jwks(status: u16, body: serde_json::Value, expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    fn client_for(server: &MockServer, ttl: Duration) -> JwksClient {
        JwksClient::new(
            format!("{}/.well-known/jwks.json", server.uri()),
            ttl,
            Duration::from_secs(2),
        )
    }

    #[test]
    fn test_jwk_deserialization() {
        let json = r#"{
            "kty": "RSA",
            "kid": "test-key-01",
            "use": "sig",
            "n": "xyOjF4BnWjiH74sK",
            "e": "AQAB",
            "alg": "RS256"
        }"#;

        let jwk: Jwk = serde_json::from_str(json).unwrap();

        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, "test-key-01");
        assert_eq!(jwk.key_use.as_deref(), Some("sig"));
        assert_eq!(jwk.n.as_deref(), Some("xyOjF4BnWjiH74sK"));
        assert_eq!(jwk.e.as_deref(), Some("AQAB"));
        assert_eq!(jwk.alg.as_deref(), Some("RS256"));
    }

    #[test]
    fn test_jwk_deserialization_minimal() {
        let jwk: Jwk = serde_json::from_str(r#"{"kty": "RSA", "kid": "k"}"#).unwrap();

        assert!(jwk.key_use.is_none());
        assert!(jwk.n.is_none());
        assert!(jwk.e.is_none());
        assert!(jwk.alg.is_none());
    }

    #[test]
    fn test_jwks_client_creation() {
        let client = JwksClient::new(
            "https://tenant.example.com/.well-known/jwks.json".to_string(),
            Duration::from_secs(60),
            Duration::from_secs(5),
        );
        assert_eq!(
            client.jwks_url(),
            "https://tenant.example.com/.well-known/jwks.json"
        );
        assert_eq!(client.cache_ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_get_key_fetches_and_caches() {
        let server = mock_jwks(200, jwks_body(), 1).await;
        let client = client_for(&server, Duration::from_secs(300));

        let first = client.get_key("key-1").await.unwrap();
        let second = client.get_key("key-2").await.unwrap();

        assert_eq!(first.kid, "key-1");
        assert_eq!(second.kid, "key-2");
        // MockServer verifies the single expected call on drop
    }

    #[tokio::test]
    async fn test_zero_ttl_refetches_every_lookup() {
        let server = mock_jwks(200, jwks_body(), 2).await;
        let client = client_for(&server, Duration::ZERO);

        client.get_key("key-1").await.unwrap();
        client.get_key("key-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_kid_is_key_not_found() {
        let server = mock_jwks(200, jwks_body(), 1).await;
        let client = client_for(&server, Duration::from_secs(300));

        let err = client.get_key("missing").await.unwrap_err();
        assert_eq!(err, AuthError::KeyNotFound);

        // Fresh cache answers without another fetch
        let err = client.get_key("missing").await.unwrap_err();
        assert_eq!(err, AuthError::KeyNotFound);
    }

    #[tokio::test]
    async fn test_error_status_is_key_set_unavailable() {
        let server = mock_jwks(500, serde_json::json!({}), 1).await;
        let client = client_for(&server, Duration::from_secs(300));

        let err = client.get_key("key-1").await.unwrap_err();
        assert_eq!(err, AuthError::KeySetUnavailable);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_key_set_unavailable() {
        let server = mock_jwks(200, serde_json::json!({"not_keys": true}), 1).await;
        let client = client_for(&server, Duration::from_secs(300));

        let err = client.get_key("key-1").await.unwrap_err();
        assert_eq!(err, AuthError::KeySetUnavailable);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_key_set_unavailable() {
        let client = JwksClient::new(
            "http://127.0.0.1:1/.well-known/jwks.json".to_string(),
            Duration::from_secs(300),
            Duration::from_secs(1),
        );

        let err = client.get_key("key-1").await.unwrap_err();
        assert_eq!(err, AuthError::KeySetUnavailable);
    }
}
