//! Persisted session values.
//!
//! Exactly two string keys survive an app restart: the bearer token and a
//! JSON snapshot of the signed-in user. Hosts back [`SessionStorage`] with
//! the platform keychain or async storage; [`MemoryStorage`] serves tests and
//! hosts that opt out of persistence. No locking across keys: concurrent
//! writers race and the last write wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::warn;

use crate::types::User;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(String),

    #[error("stored value for '{key}' is corrupt: {reason}")]
    Corrupt { key: &'static str, reason: String },
}

/// String-keyed durable storage supplied by the host.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))?;
        map.remove(key);
        Ok(())
    }
}

pub fn load_token(storage: &dyn SessionStorage) -> Result<Option<String>, StorageError> {
    Ok(storage.get(TOKEN_KEY)?.filter(|token| !token.is_empty()))
}

pub fn load_user(storage: &dyn SessionStorage) -> Result<Option<User>, StorageError> {
    match storage.get(USER_KEY)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: USER_KEY,
                reason: e.to_string(),
            }),
    }
}

pub fn save_user(storage: &dyn SessionStorage, user: &User) -> Result<(), StorageError> {
    let raw = serde_json::to_string(user).map_err(|e| StorageError::Corrupt {
        key: USER_KEY,
        reason: e.to_string(),
    })?;
    storage.set(USER_KEY, &raw)
}

pub fn persist_session(
    storage: &dyn SessionStorage,
    token: &str,
    user: &User,
) -> Result<(), StorageError> {
    storage.set(TOKEN_KEY, token)?;
    save_user(storage, user)
}

/// Remove both keys. Attempts the second removal even if the first fails.
pub fn purge_session(storage: &dyn SessionStorage) -> Result<(), StorageError> {
    let token = storage.remove(TOKEN_KEY);
    let user = storage.remove(USER_KEY);
    if let Err(e) = &token {
        warn!(error = %e, "failed to remove persisted token");
    }
    token.and(user)
}
