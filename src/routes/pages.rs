// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side page routes for the SPA.
//!
//! Each app page applies the navigation guard before serving the shell:
//! anonymous visitors bounce to /login, half-registered accounts to
//! /onboarding, and so on. The policy itself lives in [`crate::guard`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::guard::{self, AuthState, Page, RouteDecision};
use crate::middleware::auth::{decode_session, SESSION_COOKIE};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home_page))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/onboarding", get(onboarding_page))
        .route("/friends", get(friends_page))
        .route("/notifications", get(notifications_page))
        .route("/chat/{id}", get(chat_page))
        .route("/call/{id}", get(call_page))
}

async fn home_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    page(state, jar, Page::Home).await
}

async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    page(state, jar, Page::Login).await
}

async fn signup_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    page(state, jar, Page::Signup).await
}

async fn onboarding_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    page(state, jar, Page::Onboarding).await
}

async fn friends_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    page(state, jar, Page::Friends).await
}

async fn notifications_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    page(state, jar, Page::Notifications).await
}

async fn chat_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(_id): Path<String>,
) -> Response {
    page(state, jar, Page::Chat).await
}

async fn call_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(_id): Path<String>,
) -> Response {
    page(state, jar, Page::Call).await
}

/// Resolve the guard and either redirect or serve the SPA shell.
async fn page(state: Arc<AppState>, jar: CookieJar, page: Page) -> Response {
    let auth = current_auth_state(&state, &jar).await;

    match guard::resolve(page, auth) {
        RouteDecision::Allow => serve_shell(&state).await,
        RouteDecision::Redirect(to) => Redirect::temporary(to.path()).into_response(),
    }
}

/// Resolve the session cookie to guard facts.
///
/// Fails closed: a bad token, a deleted account, or an unreachable
/// database all read as "no session".
async fn current_auth_state(state: &AppState, jar: &CookieJar) -> AuthState {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return AuthState::default();
    };

    let Some(claims) = decode_session(cookie.value(), &state.config.jwt_signing_key) else {
        return AuthState::default();
    };

    match state.db.get_user(&claims.sub).await {
        Ok(Some(user)) => AuthState {
            authenticated: true,
            onboarded: user.is_onboarded,
        },
        Ok(None) => AuthState::default(),
        Err(e) => {
            tracing::warn!(error = %e, "Guard lookup failed, treating request as anonymous");
            AuthState::default()
        }
    }
}

/// Serve the built SPA's index.html.
async fn serve_shell(state: &AppState) -> Response {
    let index = std::path::Path::new(&state.config.spa_dist).join("index.html");

    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(path = %index.display(), error = %e, "SPA shell not found");
            (StatusCode::NOT_FOUND, "frontend build not found").into_response()
        }
    }
}
