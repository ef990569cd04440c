// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat/video token route.

use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::AppState;

/// Chat routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/chat/token", get(get_token))
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Mint a Stream access token for the caller.
///
/// The Stream SDKs on the client use this token for both messaging and
/// calls; nothing is persisted server-side.
async fn get_token(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TokenResponse>> {
    let token = state.chat.create_token(&user.user_id)?;
    Ok(Json(TokenResponse { token }))
}
