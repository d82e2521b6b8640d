//! HTTP routes for the casting service.
//!
//! Defines the Axum router and application state.

use crate::auth::JwtValidator;
use crate::config::Config;
use crate::handlers;
use crate::middleware::{
    error_envelope, http_metrics_middleware, require_permission, PermissionGate,
};
use crate::repositories::{ActorsRepository, DatabaseHealth, MoviesRepository};
use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Overall per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub actors: Arc<dyn ActorsRepository>,

    pub movies: Arc<dyn MoviesRepository>,

    /// Connectivity probe for `/ready`.
    pub database: Arc<dyn DatabaseHealth>,

    /// Token validator shared by every permission gate.
    pub validator: Arc<JwtValidator>,

    pub config: Config,
}

/// Wrap a method route in a permission gate.
fn gated(
    route: MethodRouter<Arc<AppState>>,
    validator: &Arc<JwtValidator>,
    permission: &'static str,
) -> MethodRouter<Arc<AppState>> {
    route.route_layer(middleware::from_fn_with_state(
        PermissionGate::new(Arc::clone(validator), permission),
        require_permission,
    ))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

/// Build the application routes.
///
/// - `/health`, `/ready`, `/metrics` - public operational endpoints
/// - `/actors`, `/actors/:id` - permission-gated actor CRUD
/// - `/movies`, `/movies/:id` - permission-gated movie CRUD
/// - anything else - 404 envelope
///
/// Layers, outermost first: HTTP metrics, CORS, error envelope, trace,
/// 30 second timeout.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let validator = Arc::clone(&state.validator);

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(Arc::clone(&state));

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let resource_routes = Router::new()
        .route(
            "/actors",
            gated(get(handlers::list_actors), &validator, "get:actors")
                .merge(gated(post(handlers::create_actor), &validator, "post:actors")),
        )
        .route(
            "/actors/:id",
            gated(patch(handlers::update_actor), &validator, "patch:actors")
                .merge(gated(delete(handlers::delete_actor), &validator, "delete:actors")),
        )
        .route(
            "/movies",
            gated(get(handlers::list_movies), &validator, "get:movies")
                .merge(gated(post(handlers::create_movie), &validator, "post:movies")),
        )
        .route(
            "/movies/:id",
            gated(patch(handlers::update_movie), &validator, "patch:movies")
                .merge(gated(delete(handlers::delete_movie), &validator, "delete:movies")),
        )
        .with_state(state);

    public_routes
        .merge(metrics_routes)
        .merge(resource_routes)
        .fallback(handlers::not_found)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::map_response(error_envelope))
        .layer(cors_layer())
        // Outermost so framework-level responses are counted too
        .layer(middleware::from_fn(http_metrics_middleware))
}
