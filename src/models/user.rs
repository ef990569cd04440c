//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User account stored in Firestore.
///
/// `password_hash` only ever exists on this storage struct; API responses
/// use [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document ID (uuid)
    pub id: String,
    /// Email address (unique, login identifier)
    pub email: String,
    /// Argon2id password hash
    pub password_hash: String,
    /// Display name
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
    /// Avatar URL
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub native_language: String,
    #[serde(default)]
    pub learning_language: String,
    #[serde(default)]
    pub location: String,
    /// Whether the one-time profile completion step is done
    #[serde(default)]
    pub is_onboarded: bool,
    /// Accepted-friend user IDs
    #[serde(default)]
    pub friend_ids: Vec<String>,
    /// When the account was created (RFC 3339)
    pub created_at: String,
    /// Last profile mutation (RFC 3339)
    pub updated_at: String,
}

impl User {
    /// Whether `other_id` is an accepted friend of this user.
    pub fn is_friend(&self, other_id: &str) -> bool {
        self.friend_ids.iter().any(|id| id == other_id)
    }

    /// Add a friend reference if not already present. Returns whether the
    /// set changed.
    pub fn add_friend(&mut self, other_id: &str) -> bool {
        if self.is_friend(other_id) {
            return false;
        }
        self.friend_ids.push(other_id.to_string());
        true
    }
}

/// Public projection of a user, safe to embed in any response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub bio: String,
    pub profile_pic: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub is_onboarded: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            bio: user.bio,
            profile_pic: user.profile_pic,
            native_language: user.native_language,
            learning_language: user.learning_language,
            location: user.location,
            is_onboarded: user.is_onboarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u1".to_string(),
            email: "mia@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            full_name: "Mia Tan".to_string(),
            bio: String::new(),
            profile_pic: String::new(),
            native_language: "mandarin".to_string(),
            learning_language: "spanish".to_string(),
            location: String::new(),
            is_onboarded: false,
            friend_ids: vec![],
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_add_friend_is_idempotent() {
        let mut user = sample_user();
        assert!(user.add_friend("u2"));
        assert!(!user.add_friend("u2"));
        assert_eq!(user.friend_ids, vec!["u2"]);
        assert!(user.is_friend("u2"));
        assert!(!user.is_friend("u3"));
    }

    #[test]
    fn test_profile_omits_credentials() {
        let profile = UserProfile::from(sample_user());
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_none());
        assert_eq!(json["full_name"], "Mia Tan");
    }

    #[test]
    fn test_missing_profile_fields_default() {
        // Documents written before onboarding may lack profile fields
        let json = r#"{
            "id": "u9",
            "email": "b@example.com",
            "password_hash": "h",
            "full_name": "B",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.is_onboarded);
        assert!(user.friend_ids.is_empty());
        assert_eq!(user.bio, "");
    }
}
