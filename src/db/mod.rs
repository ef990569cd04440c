//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Directed friend requests (keyed by `"{sender}_{recipient}"`)
    pub const FRIEND_REQUESTS: &str = "friend_requests";
}
