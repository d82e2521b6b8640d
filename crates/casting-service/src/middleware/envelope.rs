//! Rewrites framework-generated error responses into the JSON error envelope.
//!
//! Handler and middleware errors already render as JSON. Responses produced
//! by the router or tower layers (405, 408, 413, 415, ...) carry a plain-text
//! or empty body; those are replaced with `ErrorResponse`.

use crate::errors::ErrorResponse;
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Headers carried over from the original response.
const PRESERVED_HEADERS: [header::HeaderName; 2] = [header::ALLOW, header::WWW_AUTHENTICATE];

pub async fn error_envelope(response: Response) -> Response {
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) || is_json(response.headers()) {
        return response;
    }

    tracing::debug!(target: "casting.middleware.envelope", status = %status, "Wrapping framework error");

    let (parts, _) = response.into_parts();
    let body = ErrorResponse::new(status.as_u16(), envelope_message(status));
    let mut rewritten = (status, Json(body)).into_response();

    for name in PRESERVED_HEADERS {
        if let Some(value) = parts.headers.get(&name) {
            rewritten.headers_mut().insert(name, value.clone());
        }
    }

    rewritten
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

fn envelope_message(status: StatusCode) -> String {
    match status {
        StatusCode::BAD_REQUEST => "bad request".to_string(),
        StatusCode::NOT_FOUND => "resource not found".to_string(),
        StatusCode::METHOD_NOT_ALLOWED => "method not allowed".to_string(),
        StatusCode::UNPROCESSABLE_ENTITY => "unprocessable".to_string(),
        StatusCode::INTERNAL_SERVER_ERROR => "internal server error".to_string(),
        other => other
            .canonical_reason()
            .map(str::to_lowercase)
            .unwrap_or_else(|| "error".to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::Request,
        middleware,
        routing::get,
        Router,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn json_error() -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(401, "Token expired.")),
        )
            .into_response()
    }

    async fn plain_error() -> (StatusCode, &'static str) {
        (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded")
    }

    fn test_app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "OK" }))
            .route("/json", get(json_error))
            .route("/plain", get(plain_error))
            .layer(middleware::map_response(error_envelope))
    }

    async fn call(method: &str, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        test_app().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_untouched() {
        let response = call("GET", "/ok").await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, "OK");
    }

    #[tokio::test]
    async fn test_json_errors_untouched() {
        let body = body_json(call("GET", "/json").await).await;
        assert_eq!(body["message"], "Token expired.");
    }

    #[tokio::test]
    async fn test_wrong_method_rewritten_keeps_allow() {
        let response = call("DELETE", "/ok").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().get(header::ALLOW).is_some());

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": 405, "message": "method not allowed"})
        );
    }

    #[tokio::test]
    async fn test_other_framework_errors_use_canonical_reason() {
        let body = body_json(call("GET", "/plain").await).await;
        assert_eq!(body["error"], 413);
        assert_eq!(body["message"], "payload too large");
    }

    #[tokio::test]
    async fn test_unrouted_rewritten_as_not_found() {
        let body = body_json(call("GET", "/missing").await).await;
        assert_eq!(body["error"], 404);
        assert_eq!(body["message"], "resource not found");
    }
}
