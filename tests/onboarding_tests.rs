// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup and onboarding behavior against the Firestore emulator.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;

mod common;

async fn post_json(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

fn session_cookie_from(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie should be set")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    require_emulator!();
    let (app, _) = common::create_emulator_app().await;

    let email = format!("{}@example.com", Uuid::new_v4());
    let payload = serde_json::json!({
        "email": email,
        "password": "long-enough",
        "full_name": "First Claimant"
    });

    let first = post_json(&app, "/api/auth/signup", None, payload.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(&app, "/api/auth/signup", None, payload).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = common::body_json(second).await;
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_login_round_trip_and_bad_credentials() {
    require_emulator!();
    let (app, _) = common::create_emulator_app().await;

    let email = format!("{}@example.com", Uuid::new_v4());
    let signup = post_json(
        &app,
        "/api/auth/signup",
        None,
        serde_json::json!({
            "email": email,
            "password": "long-enough",
            "full_name": "Mia Tan"
        }),
    )
    .await;
    assert_eq!(signup.status(), StatusCode::CREATED);

    let login = post_json(
        &app,
        "/api/auth/login",
        None,
        serde_json::json!({ "email": email, "password": "long-enough" }),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let cookie = session_cookie_from(&login);

    // The fresh session works against a protected route
    let me = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    let profile = common::body_json(me).await;
    assert_eq!(profile["full_name"], "Mia Tan");
    assert_eq!(profile["is_onboarded"], false);

    // Wrong password and unknown email both read the same
    let wrong = post_json(
        &app,
        "/api/auth/login",
        None,
        serde_json::json!({ "email": email, "password": "wrong-password" }),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = post_json(
        &app,
        "/api/auth/login",
        None,
        serde_json::json!({ "email": "ghost@example.com", "password": "whatever" }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_onboarding_sets_flag_and_is_idempotent() {
    require_emulator!();
    let (app, _) = common::create_emulator_app().await;

    let email = format!("{}@example.com", Uuid::new_v4());
    let signup = post_json(
        &app,
        "/api/auth/signup",
        None,
        serde_json::json!({
            "email": email,
            "password": "long-enough",
            "full_name": "Mia Tan"
        }),
    )
    .await;
    let cookie = session_cookie_from(&signup);

    let fields = serde_json::json!({
        "full_name": "Mia Tan",
        "bio": "hola",
        "native_language": "Mandarin",
        "learning_language": "Spanish",
        "location": "Taipei"
    });

    let first = post_json(&app, "/api/auth/onboarding", Some(&cookie), fields.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let profile = common::body_json(first).await;
    assert_eq!(profile["is_onboarded"], true);
    // Languages are normalized for matching
    assert_eq!(profile["native_language"], "mandarin");
    assert_eq!(profile["learning_language"], "spanish");
    // The signup avatar survives when no replacement is sent
    assert!(profile["profile_pic"]
        .as_str()
        .unwrap()
        .starts_with("https://avatar.iran.liara.run/"));

    // Identical re-submission succeeds and changes nothing
    let second = post_json(&app, "/api/auth/onboarding", Some(&cookie), fields).await;
    assert_eq!(second.status(), StatusCode::OK);
    let repeat = common::body_json(second).await;
    assert_eq!(repeat["is_onboarded"], true);
    assert_eq!(repeat["bio"], "hola");
}

#[tokio::test]
async fn test_logout_clears_the_session_cookie() {
    // No database involved; runs offline
    let (app, _) = common::create_test_app();

    let response = post_json(&app, "/api/auth/logout", None, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout should clear the cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("lingopal_session="));
    assert!(
        set_cookie.contains("Max-Age=0") || set_cookie.contains("Expires="),
        "removal cookie should expire immediately: {set_cookie}"
    );
}
