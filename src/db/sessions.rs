// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redis-backed session token store.
//!
//! Holds, per user, the list of currently-valid refresh tokens under a key
//! with a one-shot TTL. Only the five primitives the token lifecycle needs
//! are exposed; the policy (key naming, when to set the TTL) lives in
//! `services::tokens`. An in-memory backend backs the integration tests.

use crate::error::AppError;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Key-value store for refresh-token session lists.
#[derive(Clone)]
pub struct SessionStore {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Redis(ConnectionManager),
    Memory(Arc<Mutex<HashMap<String, MemoryEntry>>>),
}

#[derive(Default)]
struct MemoryEntry {
    tokens: Vec<String>,
    ttl_secs: Option<i64>,
}

impl SessionStore {
    /// Connect to Redis. The connection manager multiplexes and reconnects,
    /// so one handle is shared across all requests.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::SessionStore(format!("Invalid Redis URL: {}", e)))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::SessionStore(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            backend: Backend::Redis(manager),
        })
    }

    /// Create an in-memory store for testing (no external Redis).
    pub fn new_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    /// Whether the key currently exists.
    pub async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut con = manager.clone();
                con.exists(key)
                    .await
                    .map_err(|e| AppError::SessionStore(e.to_string()))
            }
            Backend::Memory(map) => Ok(map.lock().unwrap().contains_key(key)),
        }
    }

    /// Prepend a value to the list at `key`, creating the key if needed.
    pub async fn list_push(&self, key: &str, value: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut con = manager.clone();
                let _: () = con
                    .lpush(key, value)
                    .await
                    .map_err(|e| AppError::SessionStore(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(map) => {
                let mut map = map.lock().unwrap();
                map.entry(key.to_string())
                    .or_default()
                    .tokens
                    .insert(0, value.to_string());
                Ok(())
            }
        }
    }

    /// Set the key's TTL in seconds.
    pub async fn expire(&self, key: &str, seconds: i64) -> Result<(), AppError> {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut con = manager.clone();
                let _: () = con
                    .expire(key, seconds)
                    .await
                    .map_err(|e| AppError::SessionStore(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(map) => {
                if let Some(entry) = map.lock().unwrap().get_mut(key) {
                    entry.ttl_secs = Some(seconds);
                }
                Ok(())
            }
        }
    }

    /// Read the full list stored at `key` (empty if the key is gone).
    pub async fn list_range(&self, key: &str) -> Result<Vec<String>, AppError> {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut con = manager.clone();
                con.lrange(key, 0, -1)
                    .await
                    .map_err(|e| AppError::SessionStore(e.to_string()))
            }
            Backend::Memory(map) => Ok(map
                .lock()
                .unwrap()
                .get(key)
                .map(|entry| entry.tokens.clone())
                .unwrap_or_default()),
        }
    }

    /// Delete the key and everything under it.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Redis(manager) => {
                let mut con = manager.clone();
                let _: () = con
                    .del(key)
                    .await
                    .map_err(|e| AppError::SessionStore(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(map) => {
                map.lock().unwrap().remove(key);
                Ok(())
            }
        }
    }

    /// TTL recorded for a key, if any. Memory backend only; used by tests to
    /// check that the expiry is set exactly once.
    #[cfg(test)]
    pub(crate) fn memory_ttl(&self, key: &str) -> Option<i64> {
        match &self.backend {
            Backend::Memory(map) => map.lock().unwrap().get(key).and_then(|e| e.ttl_secs),
            Backend::Redis(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_creates_key_and_preserves_order() {
        let store = SessionStore::new_memory();
        assert!(!store.exists("refreshTokens:u1").await.unwrap());

        store.list_push("refreshTokens:u1", "first").await.unwrap();
        store.list_push("refreshTokens:u1", "second").await.unwrap();

        assert!(store.exists("refreshTokens:u1").await.unwrap());
        // LPUSH semantics: newest entry at the head
        let tokens = store.list_range("refreshTokens:u1").await.unwrap();
        assert_eq!(tokens, vec!["second".to_string(), "first".to_string()]);
    }

    #[tokio::test]
    async fn test_range_on_missing_key_is_empty() {
        let store = SessionStore::new_memory();
        assert!(store.list_range("refreshTokens:gone").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_key() {
        let store = SessionStore::new_memory();
        store.list_push("refreshTokens:u1", "tok").await.unwrap();
        store.delete("refreshTokens:u1").await.unwrap();

        assert!(!store.exists("refreshTokens:u1").await.unwrap());
        assert!(store.list_range("refreshTokens:u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expire_records_ttl() {
        let store = SessionStore::new_memory();
        store.list_push("refreshTokens:u1", "tok").await.unwrap();
        store.expire("refreshTokens:u1", 604_800).await.unwrap();
        assert_eq!(store.memory_ttl("refreshTokens:u1"), Some(604_800));
    }
}
