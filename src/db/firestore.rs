// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts, profiles, friend references)
//! - Friend requests (directed join records)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{FriendRequest, RequestStatus, User};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by email (the login identifier).
    ///
    /// Email uniqueness is maintained by checking here before signup writes.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let matches: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.into_iter().next())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All users who completed onboarding.
    ///
    /// Candidate pool for partner recommendations; the caller filters out
    /// itself and existing friends.
    pub async fn list_onboarded_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("is_onboarded").eq(true)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch several users by ID with bounded concurrency.
    ///
    /// IDs with no backing document are skipped (deleted accounts referenced
    /// from stale friend lists).
    pub async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>, AppError> {
        let users: Vec<Option<User>> = stream::iter(user_ids.to_vec())
            .map(|id| async move { self.get_user(&id).await })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<User>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<User>>, AppError>>()?;

        Ok(users.into_iter().flatten().collect())
    }

    // ─── Friend Request Operations ───────────────────────────────

    /// Get a friend request by document ID.
    pub async fn get_friend_request(&self, id: &str) -> Result<Option<FriendRequest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FRIEND_REQUESTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a request between two users in either direction.
    ///
    /// Document IDs are deterministic per ordered pair, so two point reads
    /// cover both directions.
    pub async fn request_between(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<FriendRequest>, AppError> {
        if let Some(req) = self.get_friend_request(&FriendRequest::doc_id(a, b)).await? {
            return Ok(Some(req));
        }
        self.get_friend_request(&FriendRequest::doc_id(b, a)).await
    }

    /// Create or update a friend request.
    pub async fn upsert_friend_request(&self, request: &FriendRequest) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::FRIEND_REQUESTS)
            .document_id(&request.id)
            .object(request)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Requests with the given status addressed to `recipient_id`.
    pub async fn requests_to(
        &self,
        recipient_id: &str,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, AppError> {
        let recipient_id = recipient_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FRIEND_REQUESTS)
            .filter(move |q| {
                q.for_all([
                    q.field("recipient_id").eq(recipient_id.clone()),
                    q.field("status").eq(status.as_str()),
                ])
            })
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests with the given status sent by `sender_id`.
    pub async fn requests_from(
        &self,
        sender_id: &str,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, AppError> {
        let sender_id = sender_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FRIEND_REQUESTS)
            .filter(move |q| {
                q.for_all([
                    q.field("sender_id").eq(sender_id.clone()),
                    q.field("status").eq(status.as_str()),
                ])
            })
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Request Acceptance ───────────────────────────────

    /// Atomically accept a friend request: flip the status and add the
    /// mutual friend references.
    ///
    /// Runs in a Firestore transaction so the request flip and both friend
    /// lists commit together; a concurrent accept retries against fresh
    /// data instead of losing an update.
    ///
    /// Returns `true` if the request was newly accepted, `false` if it was
    /// already accepted (idempotent duplicate).
    pub async fn accept_request_atomic(&self, request_id: &str) -> Result<bool, AppError> {
        let now = chrono::Utc::now().to_rfc3339();

        // Safety check before opening the transaction: both accounts must
        // still exist, or we would resurrect a deleted user's friend list.
        let probe = self.get_friend_request(request_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Friend request {} not found", request_id))
        })?;
        let mut sender = self.get_user(&probe.sender_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("User {} not found", probe.sender_id))
        })?;
        let mut recipient = self.get_user(&probe.recipient_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("User {} not found", probe.recipient_id))
        })?;

        // Begin a transaction
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Re-read the request within the transaction window
        let mut request = match self.get_friend_request(request_id).await? {
            Some(req) => req,
            None => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!(
                    "Friend request {} not found",
                    request_id
                )));
            }
        };

        // 2. Idempotency - a second accept is a no-op
        if request.status == RequestStatus::Accepted {
            tracing::debug!(request_id, "Request already accepted (idempotent skip)");
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        // 3. Update in memory
        request.status = RequestStatus::Accepted;
        request.updated_at = now.clone();
        sender.add_friend(&recipient.id);
        recipient.add_friend(&sender.id);
        sender.updated_at = now.clone();
        recipient.updated_at = now;

        // 4. Stage all three writes
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::FRIEND_REQUESTS)
            .document_id(&request.id)
            .object(&request)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add request to transaction: {}", e))
            })?;

        for user in [&sender, &recipient] {
            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(&user.id)
                .object(user)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add user to transaction: {}", e))
                })?;
        }

        // 5. Commit atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            request_id,
            sender_id = %sender.id,
            recipient_id = %recipient.id,
            "Friend request accepted"
        );

        Ok(true)
    }
}
