// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use lingopal::config::Config;
use lingopal::db::FirestoreDb;
use lingopal::routes::create_router;
use lingopal::services::ChatService;
use lingopal::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let chat = ChatService::new_mock();

    let state = Arc::new(AppState { config, db, chat });

    (create_router(state.clone()), state)
}

/// Create a test app backed by the Firestore emulator.
/// Chat stays mocked so no network leaves the process.
#[allow(dead_code)]
pub async fn create_emulator_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db().await;
    let chat = ChatService::new_mock();

    let state = Arc::new(AppState { config, db, chat });

    (create_router(state.clone()), state)
}

/// Create a session JWT for tests.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    lingopal::middleware::auth::create_jwt(user_id, signing_key)
        .expect("test JWT creation should not fail")
}

/// Session cookie header value for a user.
#[allow(dead_code)]
pub fn session_cookie(user_id: &str, signing_key: &[u8]) -> String {
    format!(
        "{}={}",
        lingopal::middleware::auth::SESSION_COOKIE,
        create_test_jwt(user_id, signing_key)
    )
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
