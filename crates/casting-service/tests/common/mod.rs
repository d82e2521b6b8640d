//! Shared setup for the integration tests.

#![allow(dead_code)]

use casting_test_utils::{MockJwksServer, TestCastingServer, TestKeypair, TestTokenBuilder};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;

/// A running server with a mocked JWKS publishing the primary key.
pub struct TestContext {
    pub jwks: MockJwksServer,
    pub server: TestCastingServer,
    pub keypair: TestKeypair,
    pub client: reqwest::Client,
}

impl TestContext {
    pub async fn start() -> Self {
        let keypair = TestKeypair::primary();
        let jwks = MockJwksServer::start(&[keypair.clone()]).await;
        let server = TestCastingServer::spawn(&jwks.jwks_url())
            .await
            .expect("test server should spawn");

        Self {
            jwks,
            server,
            keypair,
            client: reqwest::Client::new(),
        }
    }

    /// Signed token carrying `permissions`.
    pub fn token(&self, permissions: &[&str]) -> String {
        TestTokenBuilder::for_role(permissions).sign(&self.keypair)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.server.url(), path))
    }

    /// Request authorized with a token granting `permissions`.
    pub fn authorized(&self, method: Method, path: &str, permissions: &[&str]) -> RequestBuilder {
        self.request(method, path).bearer_auth(self.token(permissions))
    }
}

/// Status and parsed JSON body.
pub async fn status_and_json(response: Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json().await.expect("response body should be JSON");
    (status, body)
}
