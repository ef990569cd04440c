// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod friend_request;
pub mod user;

pub use friend_request::{FriendRequest, RequestStatus};
pub use user::{User, UserProfile};
