//! User accounts for password login

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// bcrypt cost used for new accounts
pub const PASSWORD_HASH_COST: u32 = 12;

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
}

impl User {
    /// Check a plaintext password against the stored bcrypt hash
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// Hash a plaintext password with bcrypt
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).context("Failed to hash password")
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Returns `false` if the username is already taken.
    async fn create_user(&self, user: User) -> Result<bool>;

    async fn get_user(&self, username: &str) -> Result<Option<User>>;
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: User) -> Result<bool> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Ok(false);
        }
        users.insert(user.username.clone(), user);
        Ok(true)
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, password: &str) -> User {
        User {
            username: name.to_string(),
            password_hash: hash_password(password, 4).unwrap(), // cost 4 for fast tests
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryUserStore::new();
        assert!(store.create_user(user("alice", "secret")).await.unwrap());

        let alice = store.get_user("alice").await.unwrap().unwrap();
        assert!(alice.verify_password("secret"));
        assert!(!alice.verify_password("wrong"));
        assert!(store.get_user("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = InMemoryUserStore::new();
        assert!(store.create_user(user("alice", "one")).await.unwrap());
        assert!(!store.create_user(user("alice", "two")).await.unwrap());

        // First registration wins
        let alice = store.get_user("alice").await.unwrap().unwrap();
        assert!(alice.verify_password("one"));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        let user = User {
            username: "eve".into(),
            password_hash: "not-a-bcrypt-hash".into(),
        };
        assert!(!user.verify_password("not-a-bcrypt-hash"));
    }
}
