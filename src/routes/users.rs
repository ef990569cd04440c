// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friend management routes (all require authentication).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{FriendRequest, RequestStatus, User, UserProfile};
use crate::AppState;

/// Friend management routes.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(get_recommended_users))
        .route("/api/users/friends", get(get_friends))
        .route("/api/users/friend-request/{id}", post(send_friend_request))
        .route(
            "/api/users/friend-request/{id}/accept",
            put(accept_friend_request),
        )
        .route("/api/users/friend-requests", get(get_friend_requests))
        .route(
            "/api/users/outgoing-friend-requests",
            get(get_outgoing_friend_requests),
        )
}

async fn current_user(state: &AppState, user_id: &str) -> Result<User> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

// ─── Recommendations & Friends ───────────────────────────────

/// Suggested language partners: onboarded users who aren't the caller and
/// aren't already friends.
async fn get_recommended_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<UserProfile>>> {
    let me = current_user(&state, &user.user_id).await?;

    // Firestore has no "not-in" over another document's array; the
    // onboarded pool is small enough to filter here.
    let recommended: Vec<UserProfile> = state
        .db
        .list_onboarded_users()
        .await?
        .into_iter()
        .filter(|candidate| candidate.id != me.id && !me.is_friend(&candidate.id))
        .map(UserProfile::from)
        .collect();

    tracing::debug!(
        user_id = %me.id,
        count = recommended.len(),
        "Recommended partners"
    );

    Ok(Json(recommended))
}

/// Profiles of the caller's accepted friends.
async fn get_friends(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<UserProfile>>> {
    let me = current_user(&state, &user.user_id).await?;

    let friends: Vec<UserProfile> = state
        .db
        .get_users(&me.friend_ids)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    Ok(Json(friends))
}

// ─── Sending / Accepting Requests ────────────────────────────

/// Send a friend request to another user.
async fn send_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(recipient_id): Path<String>,
) -> Result<(StatusCode, Json<FriendRequest>)> {
    if recipient_id == user.user_id {
        return Err(AppError::BadRequest(
            "You can't send a friend request to yourself".to_string(),
        ));
    }

    let recipient = state
        .db
        .get_user(&recipient_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", recipient_id)))?;

    if recipient.is_friend(&user.user_id) {
        return Err(AppError::BadRequest(
            "You are already friends with this user".to_string(),
        ));
    }

    if state
        .db
        .request_between(&user.user_id, &recipient_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "A friend request already exists between you and this user".to_string(),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let request = FriendRequest::new(&user.user_id, &recipient_id, &now);
    state.db.upsert_friend_request(&request).await?;

    tracing::info!(
        sender_id = %user.user_id,
        recipient_id = %recipient_id,
        "Friend request sent"
    );

    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Serialize)]
pub struct AcceptResponse {
    pub success: bool,
    pub message: String,
}

/// Accept a friend request addressed to the caller.
async fn accept_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(request_id): Path<String>,
) -> Result<Json<AcceptResponse>> {
    let request = state
        .db
        .get_friend_request(&request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Friend request {} not found", request_id)))?;

    if request.recipient_id != user.user_id {
        return Err(AppError::Forbidden(
            "This friend request is not addressed to you".to_string(),
        ));
    }

    let newly_accepted = state.db.accept_request_atomic(&request_id).await?;

    let message = if newly_accepted {
        "Friend request accepted"
    } else {
        "Friend request was already accepted"
    };

    Ok(Json(AcceptResponse {
        success: true,
        message: message.to_string(),
    }))
}

// ─── Request Listings ────────────────────────────────────────

#[derive(Serialize)]
pub struct IncomingFriendRequest {
    pub id: String,
    pub sender: UserProfile,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct AcceptedFriendRequest {
    pub id: String,
    pub recipient: UserProfile,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct OutgoingFriendRequest {
    pub id: String,
    pub recipient: UserProfile,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct FriendRequestsResponse {
    /// Pending requests awaiting the caller's decision
    pub incoming: Vec<IncomingFriendRequest>,
    /// Requests the caller sent that got accepted (notification feed)
    pub accepted: Vec<AcceptedFriendRequest>,
}

/// Embed profiles for one side of a batch of requests.
///
/// Requests whose counterpart account has vanished are dropped.
async fn profiles_for(state: &AppState, ids: Vec<String>) -> Result<HashMap<String, UserProfile>> {
    let users = state.db.get_users(&ids).await?;
    Ok(users
        .into_iter()
        .map(|u| (u.id.clone(), UserProfile::from(u)))
        .collect())
}

/// Incoming pending requests plus accepted-by-the-other-side notifications.
async fn get_friend_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FriendRequestsResponse>> {
    let incoming_reqs = state
        .db
        .requests_to(&user.user_id, RequestStatus::Pending)
        .await?;
    let accepted_reqs = state
        .db
        .requests_from(&user.user_id, RequestStatus::Accepted)
        .await?;

    let sender_profiles = profiles_for(
        &state,
        incoming_reqs.iter().map(|r| r.sender_id.clone()).collect(),
    )
    .await?;
    let recipient_profiles = profiles_for(
        &state,
        accepted_reqs
            .iter()
            .map(|r| r.recipient_id.clone())
            .collect(),
    )
    .await?;

    let incoming = incoming_reqs
        .into_iter()
        .filter_map(|req| {
            sender_profiles
                .get(&req.sender_id)
                .cloned()
                .map(|sender| IncomingFriendRequest {
                    id: req.id,
                    sender,
                    created_at: req.created_at,
                })
        })
        .collect();

    let accepted = accepted_reqs
        .into_iter()
        .filter_map(|req| {
            recipient_profiles
                .get(&req.recipient_id)
                .cloned()
                .map(|recipient| AcceptedFriendRequest {
                    id: req.id,
                    recipient,
                    updated_at: req.updated_at,
                })
        })
        .collect();

    Ok(Json(FriendRequestsResponse { incoming, accepted }))
}

/// Pending requests the caller has sent.
async fn get_outgoing_friend_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<OutgoingFriendRequest>>> {
    let outgoing_reqs = state
        .db
        .requests_from(&user.user_id, RequestStatus::Pending)
        .await?;

    let recipient_profiles = profiles_for(
        &state,
        outgoing_reqs
            .iter()
            .map(|r| r.recipient_id.clone())
            .collect(),
    )
    .await?;

    let outgoing = outgoing_reqs
        .into_iter()
        .filter_map(|req| {
            recipient_profiles
                .get(&req.recipient_id)
                .cloned()
                .map(|recipient| OutgoingFriendRequest {
                    id: req.id,
                    recipient,
                    created_at: req.created_at,
                })
        })
        .collect();

    Ok(Json(outgoing))
}
