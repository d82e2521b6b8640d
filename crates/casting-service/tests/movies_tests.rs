//! Movie endpoint tests against a running server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use casting_service::repositories::MoviesRepository;
use common::{status_and_json, TestContext};
use reqwest::Method;
use serde_json::{json, Value};

async fn create_movie(ctx: &TestContext, body: Value) -> (u16, Value) {
    let response = ctx
        .authorized(Method::POST, "/movies", &["post:movies"])
        .json(&body)
        .send()
        .await
        .unwrap();
    status_and_json(response).await
}

async fn patch_movie(ctx: &TestContext, id: &str, body: Value) -> (u16, Value) {
    let response = ctx
        .authorized(Method::PATCH, &format!("/movies/{id}"), &["patch:movies"])
        .json(&body)
        .send()
        .await
        .unwrap();
    status_and_json(response).await
}

async fn list_movies(ctx: &TestContext) -> Vec<Value> {
    let response = ctx
        .authorized(Method::GET, "/movies", &["get:movies"])
        .send()
        .await
        .unwrap();
    let (status, body) = status_and_json(response).await;
    assert_eq!(status, 200);
    body["movies"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_create_movie_round_trips_through_list() {
    let ctx = TestContext::start().await;

    let (status, body) = create_movie(
        &ctx,
        json!({"title": "Forrest Gump", "release_date": "1994-07-06"}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["movie"]["title"], "Forrest Gump");
    assert_eq!(body["movie"]["release_date"], "1994-07-06T00:00:00");

    assert_eq!(list_movies(&ctx).await, vec![body["movie"].clone()]);
}

#[tokio::test]
async fn test_create_movie_accepts_rfc3339_release_date() {
    let ctx = TestContext::start().await;

    let (status, body) = create_movie(
        &ctx,
        json!({"title": "Heat", "release_date": "1995-12-15T20:30:00Z"}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["movie"]["release_date"], "1995-12-15T20:30:00");
}

#[tokio::test]
async fn test_create_movie_with_no_fields() {
    let ctx = TestContext::start().await;

    let (status, body) = create_movie(&ctx, json!({})).await;

    assert_eq!(status, 200);
    assert_eq!(body["movie"]["title"], Value::Null);
    assert_eq!(body["movie"]["release_date"], Value::Null);
}

#[tokio::test]
async fn test_create_movie_with_bad_date_is_unprocessable() {
    let ctx = TestContext::start().await;

    let (status, body) =
        create_movie(&ctx, json!({"title": "Heat", "release_date": "next summer"})).await;

    assert_eq!(status, 422);
    assert_eq!(body["message"], "unprocessable");
    assert!(list_movies(&ctx).await.is_empty());
}

#[tokio::test]
async fn test_create_movie_with_malformed_json_is_unprocessable() {
    let ctx = TestContext::start().await;

    let response = ctx
        .authorized(Method::POST, "/movies", &["post:movies"])
        .header("Content-Type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn test_duplicate_title_is_unprocessable() {
    let ctx = TestContext::start().await;

    let (status, _) = create_movie(&ctx, json!({"title": "Heat"})).await;
    assert_eq!(status, 200);

    let (status, _) = create_movie(&ctx, json!({"title": "Heat"})).await;
    assert_eq!(status, 422);
}

#[tokio::test]
async fn test_patch_null_clears_nullable_field() {
    let ctx = TestContext::start().await;
    let (_, created) =
        create_movie(&ctx, json!({"title": "Heat", "release_date": "1995-12-15"})).await;
    let id = created["movie"]["id"].to_string();

    let (status, body) = patch_movie(&ctx, &id, json!({"release_date": null})).await;

    assert_eq!(status, 200);
    assert_eq!(body["movie"]["title"], "Heat");
    assert_eq!(body["movie"]["release_date"], Value::Null);
}

#[tokio::test]
async fn test_patch_updates_only_supplied_fields() {
    let ctx = TestContext::start().await;
    let (_, created) =
        create_movie(&ctx, json!({"title": "Heat", "release_date": "1995-12-15"})).await;
    let id = created["movie"]["id"].to_string();

    let (status, body) = patch_movie(&ctx, &id, json!({"title": "Heat (Director's Cut)"})).await;

    assert_eq!(status, 200);
    assert_eq!(body["movie"]["title"], "Heat (Director's Cut)");
    assert_eq!(body["movie"]["release_date"], "1995-12-15T00:00:00");
}

#[tokio::test]
async fn test_patch_is_idempotent() {
    let ctx = TestContext::start().await;
    let (_, created) = create_movie(&ctx, json!({"title": "Heat"})).await;
    let id = created["movie"]["id"].to_string();
    let patch = json!({"release_date": "2001-01-01T12:00:00"});

    let (_, first) = patch_movie(&ctx, &id, patch.clone()).await;
    let (_, second) = patch_movie(&ctx, &id, patch).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_patch_missing_movie_is_not_found() {
    let ctx = TestContext::start().await;

    let (status, body) = patch_movie(&ctx, "2000", json!({"title": "Ghost"})).await;

    assert_eq!(status, 404);
    assert_eq!(body["message"], "resource not found");
}

#[tokio::test]
async fn test_patch_missing_movie_with_bad_body_is_not_found() {
    let ctx = TestContext::start().await;

    let (status, _) = patch_movie(&ctx, "2000", json!("not an object")).await;

    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_delete_movie() {
    let ctx = TestContext::start().await;
    let (_, created) = create_movie(&ctx, json!({"title": "Heat"})).await;
    let id = created["movie"]["id"].as_i64().unwrap();

    let response = ctx
        .authorized(Method::DELETE, &format!("/movies/{id}"), &["delete:movies"])
        .send()
        .await
        .unwrap();
    let (status, body) = status_and_json(response).await;

    assert_eq!(status, 200);
    assert_eq!(body["movie"], created["movie"]);
    assert!(ctx.server.movies().get(id as i32).await.unwrap().is_none());

    let response = ctx
        .authorized(Method::DELETE, &format!("/movies/{id}"), &["delete:movies"])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
