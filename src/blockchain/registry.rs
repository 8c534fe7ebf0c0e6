use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use std::sync::Arc;

use super::crypto::{random_secret, sha256_hex};

/// A registered user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier assigned at registration
    pub uid: String,

    /// Display name of the user
    pub name: String,

    /// Per-user secret combined with the private hash to derive the
    /// public hash
    pub recovery_key: String,
}

/// Maps user identifiers to private hashes and to user records.
///
/// A plain key-value collaborator: the ledger reads it during identity
/// derivation but never mutates it as part of chain operations.
#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    private_hashes: Arc<DashMap<String, String>>,
    users: Arc<DashMap<String, User>>,
}

impl UserRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        UserRegistry {
            private_hashes: Arc::new(DashMap::new()),
            users: Arc::new(DashMap::new()),
        }
    }

    /// Registers a new user: mints a uid, a private hash and a
    /// recovery key, stores both mappings, and returns the record.
    pub fn register(&self, name: impl Into<String>) -> User {
        let uid = Uuid::new_v4().to_string();
        let private_hash = sha256_hex(random_secret().as_bytes());
        let recovery_key = random_secret();

        let user = User {
            uid: uid.clone(),
            name: name.into(),
            recovery_key,
        };

        self.private_hashes.insert(uid.clone(), private_hash);
        self.users.insert(uid, user.clone());

        user
    }

    /// Inserts a pre-built user record with its private hash
    pub fn add_user(&self, user: User, private_hash: String) {
        self.private_hashes.insert(user.uid.clone(), private_hash);
        self.users.insert(user.uid.clone(), user);
    }

    /// Looks up a user's private hash
    pub fn get_private_hash(&self, uid: &str) -> Option<String> {
        self.private_hashes.get(uid).map(|entry| entry.clone())
    }

    /// Looks up a user record by uid
    pub fn get_user(&self, uid: &str) -> Option<User> {
        self.users.get(uid).map(|entry| entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_stores_both_mappings() {
        let registry = UserRegistry::new();
        let user = registry.register("alice");

        assert_eq!(registry.get_user(&user.uid), Some(user.clone()));
        let private_hash = registry.get_private_hash(&user.uid).unwrap();
        assert_eq!(private_hash.len(), 64);
        assert!(!user.recovery_key.is_empty());
    }

    #[test]
    fn test_unknown_uid_yields_none() {
        let registry = UserRegistry::new();

        assert_eq!(registry.get_private_hash("missing"), None);
        assert_eq!(registry.get_user("missing"), None);
    }

    #[test]
    fn test_add_user_round_trip() {
        let registry = UserRegistry::new();
        let user = User {
            uid: "u1".to_string(),
            name: "bob".to_string(),
            recovery_key: "key".to_string(),
        };

        registry.add_user(user.clone(), "private".to_string());

        assert_eq!(registry.get_user("u1"), Some(user));
        assert_eq!(registry.get_private_hash("u1"), Some("private".to_string()));
    }
}
