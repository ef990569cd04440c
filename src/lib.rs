// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Lingopal: a language-exchange social network backend
//!
//! This crate provides the REST API for signup, onboarding, and friend
//! management, and bridges user identity into the hosted Stream chat/video
//! service.

pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::ChatService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub chat: ChatService,
}
