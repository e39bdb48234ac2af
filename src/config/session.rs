use super::store::{KeyValueStore, StoreError, KEY_TOKEN, KEY_USERNAME};
use crate::api::Session;
use std::sync::Arc;

/// Login credentials kept across runs.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.store.set(KEY_TOKEN, &session.token)?;
        self.store.set(KEY_USERNAME, &session.username)
    }

    /// A session exists only when a token was stored.
    pub fn load(&self) -> Option<Session> {
        let token = self.store.get(KEY_TOKEN).filter(|t| !t.is_empty())?;
        let username = self.store.get(KEY_USERNAME).unwrap_or_default();
        Some(Session { token, username })
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_TOKEN)?;
        self.store.remove(KEY_USERNAME)
    }
}
