// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: signup, login, logout, profile, onboarding.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser, SESSION_COOKIE};
use crate::models::{User, UserProfile};
use crate::services::ChatUser;
use crate::AppState;

/// Routes reachable without a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// Routes behind the auth middleware (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/onboarding", post(complete_onboarding))
}

// ─── Signup / Login ──────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Flatten validator output into one message.
fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

/// Register a new account.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserProfile>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(validation_message(&e)))?;

    let email = payload.email.trim().to_lowercase();

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = crate::services::password::hash(&payload.password)?;

    // Everyone starts with a random generated avatar
    let avatar_idx = rand::thread_rng().gen_range(1..=100);
    let profile_pic = format!("https://avatar.iran.liara.run/public/{}.png", avatar_idx);

    let now = chrono::Utc::now().to_rfc3339();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        password_hash,
        full_name: payload.full_name.trim().to_string(),
        bio: String::new(),
        profile_pic,
        native_language: String::new(),
        learning_language: String::new(),
        location: String::new(),
        is_onboarded: false,
        friend_ids: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "Account created");

    sync_chat_identity(&state, &user).await;

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token)),
        Json(UserProfile::from(user)),
    ))
}

/// Log in with email and password.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserProfile>)> {
    let email = payload.email.trim().to_lowercase();

    // Same response for unknown email and bad password
    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !crate::services::password::verify(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = %user.id, "Login");

    Ok((
        jar.add(session_cookie(token)),
        Json(UserProfile::from(user)),
    ))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// Log out by clearing the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (
        jar.remove(removal),
        Json(LogoutResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
}

// ─── Current User / Onboarding ───────────────────────────────

/// Get current user profile.
async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(UserProfile::from(profile)))
}

/// Onboarding payload. Fields default to empty so we can report every
/// missing field at once instead of failing on the first.
#[derive(Deserialize)]
pub struct OnboardingRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub native_language: String,
    #[serde(default)]
    pub learning_language: String,
    #[serde(default)]
    pub location: String,
    /// Optional replacement avatar; the signup default is kept otherwise
    #[serde(default)]
    pub profile_pic: Option<String>,
}

/// Complete the one-time profile setup.
///
/// Re-submitting identical fields is a no-op that still succeeds.
async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<OnboardingRequest>,
) -> Result<Json<UserProfile>> {
    let mut missing = Vec::new();
    for (field, value) in [
        ("full_name", &payload.full_name),
        ("bio", &payload.bio),
        ("native_language", &payload.native_language),
        ("learning_language", &payload.learning_language),
        ("location", &payload.location),
    ] {
        if value.trim().is_empty() {
            missing.push(field);
        }
    }
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let mut profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    profile.full_name = payload.full_name.trim().to_string();
    profile.bio = payload.bio.trim().to_string();
    profile.native_language = payload.native_language.trim().to_lowercase();
    profile.learning_language = payload.learning_language.trim().to_lowercase();
    profile.location = payload.location.trim().to_string();
    if let Some(pic) = payload.profile_pic.filter(|p| !p.trim().is_empty()) {
        profile.profile_pic = pic.trim().to_string();
    }
    profile.is_onboarded = true;
    profile.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.upsert_user(&profile).await?;

    tracing::info!(user_id = %profile.id, "Onboarding complete");

    sync_chat_identity(&state, &profile).await;

    Ok(Json(UserProfile::from(profile)))
}

// ─── Helpers ─────────────────────────────────────────────────

/// Build the HTTP-only session cookie.
fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(7))
        .build()
}

/// Mirror the user into Stream.
///
/// A vendor outage must not fail signup or onboarding; the identity gets
/// re-upserted on the next profile change.
async fn sync_chat_identity(state: &AppState, user: &User) {
    let chat_user = ChatUser {
        id: user.id.clone(),
        name: user.full_name.clone(),
        image: (!user.profile_pic.is_empty()).then(|| user.profile_pic.clone()),
    };

    if let Err(e) = state.chat.upsert_user(chat_user).await {
        tracing::warn!(
            user_id = %user.id,
            error = %e,
            "Stream identity sync failed, continuing without it"
        );
    }
}
