// SPDX-License-Identifier: MIT

//! Input validation: bad payloads must be rejected before any store access.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn authed_post(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_invalid_date_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("uid-1", &state.config.jwt_signing_key);

    // The app runs against an offline store, so a 400 here proves the
    // date check fired before any database call.
    let response = app
        .oneshot(authed_post(
            "/api/groups/AAA111/days/not-a-date/availability",
            &token,
            serde_json::json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_impossible_calendar_date_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(authed_post(
            "/api/groups/AAA111/days/2025-02-30/availability",
            &token,
            serde_json::json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_group_name_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(authed_post(
            "/api/groups",
            &token,
            serde_json::json!({"name": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlong_group_name_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(authed_post(
            "/api/groups",
            &token,
            serde_json::json!({"name": "a".repeat(61)}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_join_code_shape_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(authed_post(
            "/api/groups/join",
            &token,
            serde_json::json!({"code": "xy"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlong_block_reason_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("uid-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/me/blocked-days/2025-07-04")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"reason": "x".repeat(201)}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
