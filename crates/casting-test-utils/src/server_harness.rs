//! Test server harness for E2E testing
//!
//! Provides `TestCastingServer` for spawning real casting server instances
//! backed by in-memory repositories.

use crate::token_builders::{TEST_AUDIENCE, TEST_ISSUER};
use casting_service::auth::JwtValidator;
use casting_service::config::Config;
use casting_service::repositories::{
    InMemoryActorsRepository, InMemoryDatabaseHealth, InMemoryMoviesRepository,
};
use casting_service::routes::{self, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Configuration for a test server validating tokens against `jwks_url`.
///
/// `overrides` are applied on top of the defaults, e.g.
/// `JWKS_CACHE_TTL_SECONDS` or `JWT_LEEWAY_SECONDS`.
pub fn test_config(jwks_url: &str, overrides: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
    let mut vars = HashMap::from([
        (
            "DATABASE_URL".to_string(),
            "postgresql://test/test".to_string(),
        ),
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ("AUTH_ISSUER".to_string(), TEST_ISSUER.to_string()),
        ("JWKS_URL".to_string(), jwks_url.to_string()),
        ("API_AUDIENCE".to_string(), TEST_AUDIENCE.to_string()),
    ]);
    for (name, value) in overrides {
        vars.insert((*name).to_string(), (*value).to_string());
    }

    Config::from_vars(&vars).map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))
}

/// Application state over in-memory repositories, with handles to them.
pub struct InMemoryApp {
    pub state: Arc<AppState>,
    pub actors: Arc<InMemoryActorsRepository>,
    pub movies: Arc<InMemoryMoviesRepository>,
    pub database: Arc<InMemoryDatabaseHealth>,
}

impl InMemoryApp {
    pub fn new(config: Config) -> Self {
        let actors = Arc::new(InMemoryActorsRepository::new());
        let movies = Arc::new(InMemoryMoviesRepository::new());
        let database = Arc::new(InMemoryDatabaseHealth::new());

        let state = Arc::new(AppState {
            actors: actors.clone(),
            movies: movies.clone(),
            database: database.clone(),
            validator: Arc::new(JwtValidator::from_config(&config)),
            config,
        });

        Self {
            state,
            actors,
            movies,
            database,
        }
    }

    /// The service router over this state. Metrics render from a private,
    /// uninstalled recorder.
    pub fn router(&self) -> axum::Router {
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();
        routes::build_routes(self.state.clone(), metrics_handle)
    }
}

/// Test harness for spawning the casting server in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_list_actors() -> Result<()> {
///     let jwks = MockJwksServer::start(&[TestKeypair::primary()]).await;
///     let server = TestCastingServer::spawn(&jwks.jwks_url()).await?;
///     let token = TestTokenBuilder::for_role(roles::CASTING_ASSISTANT)
///         .sign(&TestKeypair::primary());
///
///     let response = reqwest::Client::new()
///         .get(format!("{}/actors", server.url()))
///         .bearer_auth(token)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestCastingServer {
    addr: SocketAddr,
    app: InMemoryApp,
    _handle: JoinHandle<()>,
}

impl TestCastingServer {
    /// Spawn a server with default test configuration.
    pub async fn spawn(jwks_url: &str) -> Result<Self, anyhow::Error> {
        Self::spawn_with(test_config(jwks_url, &[])?).await
    }

    /// Spawn a server with explicit configuration.
    ///
    /// Binds to a random available port (127.0.0.1:0) and serves in the
    /// background until dropped.
    pub async fn spawn_with(config: Config) -> Result<Self, anyhow::Error> {
        let app = InMemoryApp::new(config);
        let router = app.router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            app,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn config(&self) -> &Config {
        &self.app.state.config
    }

    pub fn actors(&self) -> &InMemoryActorsRepository {
        &self.app.actors
    }

    pub fn movies(&self) -> &InMemoryMoviesRepository {
        &self.app.movies
    }

    /// Readiness probe; toggle it to simulate a database outage.
    pub fn database(&self) -> &InMemoryDatabaseHealth {
        &self.app.database
    }
}

impl Drop for TestCastingServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
