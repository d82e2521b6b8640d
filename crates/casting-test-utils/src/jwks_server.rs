//! Mocked identity provider JWKS endpoint.

use crate::keys::TestKeypair;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock serves the key set on.
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// JWKS document publishing the public halves of `keys`.
pub fn jwks_body(keys: &[TestKeypair]) -> Value {
    json!({ "keys": keys.iter().map(TestKeypair::jwk).collect::<Vec<_>>() })
}

/// A wiremock server answering `GET /.well-known/jwks.json`.
pub struct MockJwksServer {
    server: MockServer,
}

impl MockJwksServer {
    /// Serve a key set containing `keys`.
    pub async fn start(keys: &[TestKeypair]) -> Self {
        Self::start_with_response(ResponseTemplate::new(200).set_body_json(jwks_body(keys))).await
    }

    /// Serve an arbitrary response, e.g. a 500 or a malformed body.
    pub async fn start_with_response(response: ResponseTemplate) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(response)
            .mount(&server)
            .await;

        Self { server }
    }

    pub fn jwks_url(&self) -> String {
        format!("{}{}", self.server.uri(), JWKS_PATH)
    }

    /// Underlying server, for request assertions.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Number of key set fetches received so far.
    pub async fn fetch_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
