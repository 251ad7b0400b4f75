//! Session state: the cached user and bearer token.
//!
//! # Design
//! The session is an explicit object handed to `ApiClient` rather than
//! ambient global state. `SessionStore` keeps the serialized
//! `{ ...user, token }` record in one well-known slot of a `Storage`
//! backend and reads it fresh on every access. Nothing here checks expiry or
//! staleness; the last write wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::types::User;

/// Slot holding the serialized session record.
pub const SESSION_KEY: &str = "ticket_app_user";

/// String key-value slots, the shape of browser local storage.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.remove(key);
    }
}

/// The persisted record: the user's fields plus the token, flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Handle to the session slot. Clones share the same backend.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// A store backed by a fresh `MemoryStorage`.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn store(&self, user: &User, token: &str) {
        let record = StoredUser {
            user: user.clone(),
            token: Some(token.to_string()),
        };
        match serde_json::to_string(&record) {
            Ok(json) => self.storage.set(SESSION_KEY, json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize session record"),
        }
    }

    pub fn clear(&self) {
        self.storage.remove(SESSION_KEY);
    }

    /// The stored record, or `None` when the slot is empty or unreadable.
    pub fn stored_user(&self) -> Option<StoredUser> {
        let raw = self.storage.get(SESSION_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Bearer token from the slot. Only the `token` field is read, so a record
    /// with an unfamiliar user shape still yields its token.
    pub fn token(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct TokenOnly {
            token: Option<String>,
        }

        let raw = self.storage.get(SESSION_KEY)?;
        serde_json::from_str::<TokenOnly>(&raw)
            .ok()?
            .token
            .filter(|t| !t.is_empty())
    }

    /// True whenever the slot holds anything.
    pub fn is_authenticated(&self) -> bool {
        self.storage.get(SESSION_KEY).is_some()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            phone: None,
            role: "user".to_string(),
            avatar: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_store_has_no_token() {
        let session = SessionStore::in_memory();
        assert!(session.token().is_none());
        assert!(session.stored_user().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn store_then_read_back() {
        let session = SessionStore::in_memory();
        session.store(&user(), "tok-123");
        assert_eq!(session.token().as_deref(), Some("tok-123"));
        let stored = session.stored_user().unwrap();
        assert_eq!(stored.user, user());
        assert!(session.is_authenticated());
    }

    #[test]
    fn record_is_flat_user_with_token() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::new(storage.clone());
        session.store(&user(), "tok-123");
        let raw: serde_json::Value = serde_json::from_str(&storage.get(SESSION_KEY).unwrap()).unwrap();
        assert_eq!(raw["_id"], "u1");
        assert_eq!(raw["email"], "ada@example.com");
        assert_eq!(raw["token"], "tok-123");
    }

    #[test]
    fn clear_removes_the_slot() {
        let session = SessionStore::in_memory();
        session.store(&user(), "tok-123");
        session.clear();
        assert!(session.token().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clones_share_storage() {
        let a = SessionStore::in_memory();
        let b = a.clone();
        a.store(&user(), "shared");
        assert_eq!(b.token().as_deref(), Some("shared"));
    }

    #[test]
    fn garbage_slot_is_authenticated_but_tokenless() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(SESSION_KEY, "not json".to_string());
        let session = SessionStore::new(storage);
        assert!(session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.stored_user().is_none());
    }

    #[test]
    fn token_survives_unfamiliar_user_shape() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(SESSION_KEY, r#"{"email":"x@y.z","token":"abc"}"#.to_string());
        let session = SessionStore::new(storage);
        assert_eq!(session.token().as_deref(), Some("abc"));
    }
}
