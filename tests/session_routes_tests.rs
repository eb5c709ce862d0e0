// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Session API tests.
//!
//! These tests verify that:
//! 1. Anonymous callers and unconfigured backends see an unauthenticated session
//! 2. A verified first sign-in creates a default profile
//! 3. Admin role comes only from the stored profile
//! 4. Sign-out reaches live event streams

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use futures_util::StreamExt;
use seqher_site::models::{Role, UserProfile};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

mod common;

async fn session_with(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn session_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/session");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_anonymous_session() {
    let app = common::create_test_app().await;
    let (status, body) = session_with(&app.router, session_request(None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["status"], "unauthenticated");
    assert_eq!(body["loading"], false);
    assert_eq!(body["isAdmin"], false);
    assert!(body["user"].is_null());
}

#[tokio::test]
async fn test_first_sign_in_creates_default_profile() {
    let app = common::create_test_app().await;
    let token = common::create_test_id_token("user-1", Some("ada@example.org"), Some("Ada"));

    let (status, body) = session_with(&app.router, session_request(Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["status"], "authenticated");
    assert_eq!(body["user"]["uid"], "user-1");
    assert_eq!(body["user"]["email"], "ada@example.org");
    assert_eq!(body["user"]["displayName"], "Ada");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["isAdmin"], false);

    let stored = app.store.profile_writes();
    assert_eq!(stored, 1);

    // Second visit reuses the stored profile
    let (_, body) = session_with(&app.router, session_request(Some(&token))).await;
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(app.store.profile_writes(), 1);
}

#[tokio::test]
async fn test_finished_sessions_leave_no_hub_entries() {
    let app = common::create_test_app().await;

    for n in 0..5 {
        let token = common::create_test_id_token(&format!("visitor-{}", n), None, None);
        let (status, _) = session_with(&app.router, session_request(Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert!(app.state.sessions.is_empty());
}

#[tokio::test]
async fn test_sign_out_expires_session_cookie() {
    let app = common::create_test_app().await;
    let token = common::create_test_id_token("user-6", None, None);

    let request = Request::builder()
        .method("POST")
        .uri("/api/session/sign-out")
        .header(header::COOKIE, format!("__session={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("sign-out should expire the session cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("__session="));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(set_cookie.contains("Path=/"));
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let app = common::create_test_app().await;
    let token = common::create_test_id_token("user-2", None, None);

    let request = Request::builder()
        .uri("/api/session")
        .header(header::COOKIE, format!("__session={}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = session_with(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["uid"], "user-2");
}

#[tokio::test]
async fn test_admin_profile_sets_is_admin() {
    let app = common::create_test_app().await;
    app.store.put_profile(UserProfile {
        uid: "admin-1".to_string(),
        email: Some("ops@example.org".to_string()),
        display_name: Some("Operations".to_string()),
        role: Role::Admin,
    });
    let token = common::create_test_id_token("admin-1", None, Some("Token Name"));

    let (_, body) = session_with(&app.router, session_request(Some(&token))).await;

    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["displayName"], "Operations");
    assert_eq!(body["user"]["email"], "ops@example.org");
    assert_eq!(app.store.profile_writes(), 0);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = common::create_test_app().await;
    let (status, body) = session_with(&app.router, session_request(Some("not.a.token"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_store_unavailable_gives_minimal_user() {
    let app = common::create_test_app_without_store().await;
    let token = common::create_test_id_token("user-3", Some("min@example.org"), None);

    let (status, body) = session_with(&app.router, session_request(Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["status"], "authenticatedMinimal");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["isAdmin"], false);
    assert_eq!(app.store.profile_writes(), 0);
}

#[tokio::test]
async fn test_unconfigured_auth_is_unauthenticated() {
    let app = common::create_degraded_app();
    let token = common::create_test_id_token("user-4", None, None);

    let (status, body) = session_with(&app.router, session_request(Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["status"], "unauthenticated");
    assert_eq!(body["loading"], false);
}

#[tokio::test]
async fn test_sign_out_requires_identity() {
    let app = common::create_test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/session/sign-out")
        .body(Body::empty())
        .unwrap();

    let (status, body) = session_with(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

/// Read SSE frames until one carries a snapshot matching `status`.
async fn wait_for_status<S>(events: &mut S, status: &str) -> Value
where
    S: futures_util::Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let chunk = events.next().await.expect("stream ended").unwrap();
            let text = String::from_utf8(chunk.to_vec()).unwrap();
            for line in text.lines() {
                if let Some(data) = line.strip_prefix("data: ") {
                    let snapshot: Value = serde_json::from_str(data).unwrap();
                    if snapshot["state"]["status"] == status {
                        return snapshot;
                    }
                }
            }
        }
    })
    .await
    .expect("timed out waiting for session event")
}

#[tokio::test]
async fn test_sign_out_reaches_event_stream() {
    let app = common::create_test_app().await;
    let token = common::create_test_id_token("user-5", None, Some("Streamer"));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/session/events")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let mut events = response.into_body().into_data_stream();
    let snapshot = wait_for_status(&mut events, "authenticated").await;
    assert_eq!(snapshot["user"]["displayName"], "Streamer");

    let sign_out = Request::builder()
        .method("POST")
        .uri("/api/session/sign-out")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(sign_out).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let snapshot = wait_for_status(&mut events, "unauthenticated").await;
    assert!(snapshot["user"].is_null());
    assert!(app.state.sessions.is_empty());
}
