//! Casting service configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default JWKS cache TTL in seconds (5 minutes).
pub const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 300;

/// Default timeout for a single JWKS fetch.
pub const DEFAULT_JWKS_FETCH_TIMEOUT_SECONDS: u64 = 5;

/// Upper bound for the JWKS fetch timeout.
pub const MAX_JWKS_FETCH_TIMEOUT_SECONDS: u64 = 60;

/// Default leeway applied to `exp` validation.
pub const DEFAULT_JWT_LEEWAY_SECONDS: u64 = 0;

/// Maximum allowed leeway (10 minutes).
pub const MAX_JWT_LEEWAY_SECONDS: u64 = 600;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Casting service configuration.
///
/// Database URL is redacted in Debug output to prevent credential leakage.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Expected `iss` claim, e.g. `https://tenant.eu.auth0.com/`.
    pub auth_issuer: String,

    /// Expected `aud` claim (the API identifier registered with the provider).
    pub api_audience: String,

    /// URL of the identity provider's published JWKS.
    pub jwks_url: String,

    /// How long a fetched key set is trusted. Zero disables caching.
    pub jwks_cache_ttl: Duration,

    /// Timeout applied to each JWKS fetch.
    pub jwks_fetch_timeout: Duration,

    /// Leeway in seconds applied to expiry validation.
    pub jwt_leeway_seconds: u64,

    pub log_format: LogFormat,

    /// Graceful shutdown drain period.
    pub drain_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("auth_issuer", &self.auth_issuer)
            .field("api_audience", &self.api_audience)
            .field("jwks_url", &self.jwks_url)
            .field("jwks_cache_ttl", &self.jwks_cache_ttl)
            .field("jwks_fetch_timeout", &self.jwks_fetch_timeout)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("log_format", &self.log_format)
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWKS configuration: {0}")]
    InvalidJwks(String),

    #[error("Invalid JWT leeway configuration: {0}")]
    InvalidJwtLeeway(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),

    #[error("Invalid drain period: {0}")]
    InvalidDrainPeriod(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        // Issuer and JWKS URL default to the provider tenant's well-known locations
        let domain = vars
            .get("AUTH0_DOMAIN")
            .map(|d| d.trim().trim_end_matches('/').to_string())
            .filter(|d| !d.is_empty());

        let auth_issuer = match (vars.get("AUTH_ISSUER"), &domain) {
            (Some(issuer), _) => issuer.clone(),
            (None, Some(domain)) => format!("https://{}/", domain),
            (None, None) => return Err(ConfigError::MissingEnvVar("AUTH0_DOMAIN".to_string())),
        };

        let jwks_url = match (vars.get("JWKS_URL"), &domain) {
            (Some(url), _) => url.clone(),
            (None, Some(domain)) => format!("https://{}/.well-known/jwks.json", domain),
            (None, None) => return Err(ConfigError::MissingEnvVar("AUTH0_DOMAIN".to_string())),
        };

        let api_audience = vars
            .get("API_AUDIENCE")
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("API_AUDIENCE".to_string()))?
            .clone();

        let jwks_cache_ttl = if let Some(value_str) = vars.get("JWKS_CACHE_TTL_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwks(format!(
                    "JWKS_CACHE_TTL_SECONDS must be a non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?;
            Duration::from_secs(value)
        } else {
            Duration::from_secs(DEFAULT_JWKS_CACHE_TTL_SECONDS)
        };

        let jwks_fetch_timeout = if let Some(value_str) = vars.get("JWKS_FETCH_TIMEOUT_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwks(format!(
                    "JWKS_FETCH_TIMEOUT_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 || value > MAX_JWKS_FETCH_TIMEOUT_SECONDS {
                return Err(ConfigError::InvalidJwks(format!(
                    "JWKS_FETCH_TIMEOUT_SECONDS must be between 1 and {}, got {}",
                    MAX_JWKS_FETCH_TIMEOUT_SECONDS, value
                )));
            }

            Duration::from_secs(value)
        } else {
            Duration::from_secs(DEFAULT_JWKS_FETCH_TIMEOUT_SECONDS)
        };

        let jwt_leeway_seconds = if let Some(value_str) = vars.get("JWT_LEEWAY_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtLeeway(format!(
                    "JWT_LEEWAY_SECONDS must be a non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value > MAX_JWT_LEEWAY_SECONDS {
                return Err(ConfigError::InvalidJwtLeeway(format!(
                    "JWT_LEEWAY_SECONDS must not exceed {} seconds, got {}",
                    MAX_JWT_LEEWAY_SECONDS, value
                )));
            }

            value
        } else {
            DEFAULT_JWT_LEEWAY_SECONDS
        };

        let log_format = match vars.get("LOG_FORMAT").map(|s| s.to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(f) if f == "text" => LogFormat::Text,
            Some(f) if f == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidLogFormat(format!(
                    "LOG_FORMAT must be 'text' or 'json', got '{}'",
                    other
                )))
            }
        };

        let drain_seconds = match vars.get("DRAIN_SECONDS") {
            Some(value_str) => value_str.parse().map_err(|e| {
                ConfigError::InvalidDrainPeriod(format!(
                    "DRAIN_SECONDS must be a non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?,
            None => 0,
        };

        Ok(Config {
            database_url,
            bind_address,
            auth_issuer,
            api_audience,
            jwks_url,
            jwks_cache_ttl,
            jwks_fetch_timeout,
            jwt_leeway_seconds,
            log_format,
            drain_seconds,
        })
    }
}
