// Session storage abstraction
// Credentials live in a key/value store chosen at construction time

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Process-wide key/value store for session credentials
///
/// Operations never fail from the caller's point of view: implementations log
/// storage errors and degrade to "absent".
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    /// `false` for stores that cannot hold credentials at all
    fn is_persistent(&self) -> bool {
        true
    }
}

/// In-memory store, lives as long as the process
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

/// Store for contexts without persistent storage; everything reads absent
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSessionStore;

impl SessionStore for NullSessionStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}

    fn is_persistent(&self) -> bool {
        false
    }
}

/// Typed view over a session store
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Session backed by the in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Session without storage (detached mode)
    pub fn detached() -> Self {
        Self::new(Arc::new(NullSessionStore))
    }

    /// Whether credentials are attached to requests and refreshed on 401
    pub fn is_attached(&self) -> bool {
        self.store.is_persistent()
    }

    pub fn access_token(&self) -> Option<String> {
        non_empty(self.store.get(ACCESS_TOKEN_KEY))
    }

    pub fn refresh_token(&self) -> Option<String> {
        non_empty(self.store.get(REFRESH_TOKEN_KEY))
    }

    /// Store the given tokens; `None` leaves the current value in place
    pub fn set_tokens(&self, access: Option<&str>, refresh: Option<&str>) {
        if let Some(access) = access.filter(|t| !t.is_empty()) {
            self.store.set(ACCESS_TOKEN_KEY, access);
        }
        if let Some(refresh) = refresh.filter(|t| !t.is_empty()) {
            self.store.set(REFRESH_TOKEN_KEY, refresh);
        }
    }

    /// Remove both tokens
    pub fn clear(&self) {
        self.store.remove(ACCESS_TOKEN_KEY);
        self.store.remove(REFRESH_TOKEN_KEY);
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session_lifecycle() {
        let session = Session::in_memory();
        assert!(session.is_attached());
        assert!(!session.is_authenticated());

        session.set_tokens(Some("A1"), Some("R1"));
        assert_eq!(session.access_token().as_deref(), Some("A1"));
        assert_eq!(session.refresh_token().as_deref(), Some("R1"));
        assert!(session.is_authenticated());

        // Refresh without rotation keeps the refresh token
        session.set_tokens(Some("A2"), None);
        assert_eq!(session.access_token().as_deref(), Some("A2"));
        assert_eq!(session.refresh_token().as_deref(), Some("R1"));

        session.clear();
        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(ACCESS_TOKEN_KEY, "");
        let session = Session::new(store);
        assert_eq!(session.access_token(), None);

        session.set_tokens(Some(""), Some(""));
        assert_eq!(session.refresh_token(), None);
    }

    #[test]
    fn test_detached_session_ignores_writes() {
        let session = Session::detached();
        assert!(!session.is_attached());

        session.set_tokens(Some("A1"), Some("R1"));
        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
        session.clear();
    }

    #[test]
    fn test_clones_share_store() {
        let session = Session::in_memory();
        let other = session.clone();
        session.set_tokens(Some("A1"), Some("R1"));
        assert_eq!(other.access_token().as_deref(), Some("A1"));
    }
}
