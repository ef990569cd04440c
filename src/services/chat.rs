// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stream chat/video API client.
//!
//! Handles:
//! - Mirroring user identity into Stream (idempotent upsert)
//! - Minting user access tokens for the Stream SDK
//!
//! Messaging delivery, presence, and call media are Stream's problem; this
//! client only manages identity and credentials.

use crate::error::AppError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEFAULT_BASE_URL: &str = "https://chat.stream-io-api.com";

/// Projection of a user mirrored into Stream.
#[derive(Debug, Clone, Serialize)]
pub struct ChatUser {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Claims of a Stream user token.
///
/// No expiry: the claims for a given user id are fixed, so repeated token
/// requests return byte-identical tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserTokenClaims {
    pub user_id: String,
}

/// Claims of the server-to-server token used on REST calls.
#[derive(Serialize)]
struct ServerClaims {
    server: bool,
}

/// Stream API client.
///
/// Constructed once at startup and handed to handlers through `AppState`
/// rather than living as a module-level singleton.
#[derive(Clone)]
pub struct ChatService {
    /// `None` in mock mode: token minting still works, network calls fail.
    http: Option<reqwest::Client>,
    base_url: String,
    api_key: String,
    api_secret: Vec<u8>,
}

impl ChatService {
    /// Create a new Stream client with API credentials.
    ///
    /// `base_url` overrides the Stream edge, which tests point at a stub.
    pub fn new(api_key: String, api_secret: String, base_url: Option<String>) -> Self {
        Self {
            http: Some(reqwest::Client::new()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            api_secret: api_secret.into_bytes(),
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// Token minting works normally; upserts return an error so tests can
    /// exercise the degraded-sync paths.
    pub fn new_mock() -> Self {
        Self {
            http: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "test_stream_key".to_string(),
            api_secret: b"test_stream_secret".to_vec(),
        }
    }

    fn get_http(&self) -> Result<&reqwest::Client, AppError> {
        self.http
            .as_ref()
            .ok_or_else(|| AppError::ChatApi("Chat service not connected (offline mode)".to_string()))
    }

    /// Server-to-server JWT for REST authentication.
    fn server_token(&self) -> Result<String, AppError> {
        encode(
            &Header::new(Algorithm::HS256),
            &ServerClaims { server: true },
            &EncodingKey::from_secret(&self.api_secret),
        )
        .map_err(|e| AppError::ChatApi(format!("Server token signing failed: {}", e)))
    }

    /// Mint an access token for a user.
    ///
    /// Claims carry exactly the user id, so the token is deterministic per
    /// user. Signing failures surface as errors instead of being swallowed.
    pub fn create_token(&self, user_id: &str) -> Result<String, AppError> {
        if user_id.is_empty() {
            return Err(AppError::BadRequest("User ID is required".to_string()));
        }

        encode(
            &Header::new(Algorithm::HS256),
            &UserTokenClaims {
                user_id: user_id.to_string(),
            },
            &EncodingKey::from_secret(&self.api_secret),
        )
        .map_err(|e| AppError::ChatApi(format!("User token signing failed: {}", e)))
    }

    /// Create-or-update users in Stream.
    ///
    /// POST {base}/users?api_key={key} with `{"users": {id: user, ...}}`.
    /// Safe to repeat; Stream merges fields on its side.
    pub async fn upsert_users(&self, users: &[ChatUser]) -> Result<(), AppError> {
        if let Some(user) = users.iter().find(|u| u.id.is_empty()) {
            return Err(AppError::BadRequest(format!(
                "User ID is required to sync '{}'",
                user.name
            )));
        }

        let url = format!("{}/users?api_key={}", self.base_url, self.api_key);

        let by_id: HashMap<&str, &ChatUser> =
            users.iter().map(|u| (u.id.as_str(), u)).collect();
        let body = serde_json::json!({ "users": by_id });

        let response = self
            .get_http()?
            .post(&url)
            .header("Authorization", self.server_token()?)
            .header("stream-auth-type", "jwt")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ChatApi(e.to_string()))?;

        self.check_response(response).await?;

        tracing::debug!(count = users.len(), "Stream users upserted");
        Ok(())
    }

    /// Upsert a single user.
    pub async fn upsert_user(&self, user: ChatUser) -> Result<(), AppError> {
        self.upsert_users(std::slice::from_ref(&user)).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Stream rate limit hit (429)");
        }

        Err(AppError::ChatApi(format!("HTTP {}: {}", status, body)))
    }
}
