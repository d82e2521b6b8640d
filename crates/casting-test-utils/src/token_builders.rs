//! Builders for test token claim sets.

use crate::keys::TestKeypair;
use chrono::Utc;
use serde_json::{json, Map, Value};

/// Issuer the test server expects.
pub const TEST_ISSUER: &str = "https://casting-test.auth0.example/";

/// Audience the test server expects.
pub const TEST_AUDIENCE: &str = "casting";

/// Permission sets of the three casting roles.
pub mod roles {
    pub const CASTING_ASSISTANT: &[&str] = &["get:actors", "get:movies"];

    pub const CASTING_DIRECTOR: &[&str] = &[
        "get:actors",
        "get:movies",
        "post:actors",
        "delete:actors",
        "patch:actors",
        "patch:movies",
    ];

    pub const EXECUTIVE_PRODUCER: &[&str] = &[
        "get:actors",
        "get:movies",
        "post:actors",
        "delete:actors",
        "patch:actors",
        "patch:movies",
        "post:movies",
        "delete:movies",
    ];
}

/// Builder for a token claim set.
///
/// Defaults to a valid, unexpired token for the test issuer and audience
/// with an empty `permissions` array.
#[derive(Debug, Clone)]
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
}

impl TestTokenBuilder {
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        let mut claims = Map::new();
        claims.insert("iss".to_string(), json!(TEST_ISSUER));
        claims.insert("sub".to_string(), json!("auth0|casting-test-user"));
        claims.insert("aud".to_string(), json!(TEST_AUDIENCE));
        claims.insert("iat".to_string(), json!(now));
        claims.insert("exp".to_string(), json!(now + 3600));
        claims.insert("permissions".to_string(), json!([]));
        Self { claims }
    }

    /// Token for one of the `roles` permission sets.
    pub fn for_role(permissions: &[&str]) -> Self {
        Self::new().with_permissions(permissions)
    }

    pub fn with_permissions(self, permissions: &[&str]) -> Self {
        self.with_claim("permissions", json!(permissions))
    }

    /// Drop the `permissions` claim entirely.
    pub fn without_permissions(self) -> Self {
        self.without_claim("permissions")
    }

    pub fn issuer(self, issuer: &str) -> Self {
        self.with_claim("iss", json!(issuer))
    }

    pub fn audience(self, audience: &str) -> Self {
        self.with_claim("aud", json!(audience))
    }

    pub fn audiences(self, audiences: &[&str]) -> Self {
        self.with_claim("aud", json!(audiences))
    }

    /// Set `exp` relative to now. Negative values produce an expired token.
    pub fn expires_in(self, seconds: i64) -> Self {
        self.with_claim("exp", json!(Utc::now().timestamp() + seconds))
    }

    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.claims)
    }

    /// Sign the claims with `keypair` using RS256.
    pub fn sign(self, keypair: &TestKeypair) -> String {
        keypair.sign(&self.build())
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
