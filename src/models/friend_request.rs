//! Friend request join record.

use serde::{Deserialize, Serialize};

/// Lifecycle of a friend request. Requests are created pending and only
/// ever move to accepted; rejected requests are simply never accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
}

impl RequestStatus {
    /// Firestore filter value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
        }
    }
}

/// Directed friend request stored in Firestore.
///
/// The document ID is derived from the ordered `(sender, recipient)` pair,
/// so at most one request can exist per direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    /// Document ID: `"{sender_id}_{recipient_id}"`
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub status: RequestStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl FriendRequest {
    /// Document ID for the ordered pair.
    pub fn doc_id(sender_id: &str, recipient_id: &str) -> String {
        format!("{}_{}", sender_id, recipient_id)
    }

    /// Create a new pending request.
    pub fn new(sender_id: &str, recipient_id: &str, now: &str) -> Self {
        Self {
            id: Self::doc_id(sender_id, recipient_id),
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            status: RequestStatus::Pending,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}
