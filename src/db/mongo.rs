// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MongoDB client wrapper with typed user operations.
//!
//! Provides the credential-store operations the account handlers need:
//! lookup by email or id, insert with a uniqueness guarantee, save, delete.
//! An in-memory backend backs the integration tests.

use crate::db::collections;
use crate::error::AppError;
use crate::models::User;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// MongoDB duplicate-key error code (unique index violation).
const DUPLICATE_KEY: i32 = 11000;

/// Credential store for user records.
#[derive(Clone)]
pub struct UserDb {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Mongo(Collection<User>),
    Memory(Arc<RwLock<HashMap<ObjectId, User>>>),
}

impl UserDb {
    /// Connect to MongoDB and ensure the unique email index exists.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        let users: Collection<User> = client.database(database).collection(collections::USERS);

        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users
            .create_index(index)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create email index: {}", e)))?;

        tracing::info!(database, "Connected to MongoDB");

        Ok(Self {
            backend: Backend::Mongo(users),
        })
    }

    /// Create an in-memory store for testing (no external database).
    pub fn new_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(RwLock::new(HashMap::new()))),
        }
    }

    /// Look up a user by email. The email is expected to be normalized
    /// (trimmed, lowercased) by the caller.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Mongo(users) => users
                .find_one(doc! { "email": email })
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(map) => {
                let map = map.read().unwrap();
                Ok(map.values().find(|u| u.email == email).cloned())
            }
        }
    }

    /// Look up a user by id.
    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Mongo(users) => users
                .find_one(doc! { "_id": *id })
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(map) => Ok(map.read().unwrap().get(id).cloned()),
        }
    }

    /// Insert a new user. A duplicate email maps to `Conflict`.
    pub async fn insert(&self, user: User) -> Result<User, AppError> {
        match &self.backend {
            Backend::Mongo(users) => {
                users.insert_one(&user).await.map_err(|e| {
                    if is_duplicate_key(&e) {
                        AppError::Conflict("Email already in use.".to_string())
                    } else {
                        AppError::Database(e.to_string())
                    }
                })?;
                Ok(user)
            }
            Backend::Memory(map) => {
                let mut map = map.write().unwrap();
                if map.values().any(|u| u.email == user.email) {
                    return Err(AppError::Conflict("Email already in use.".to_string()));
                }
                map.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    /// Persist changes to an existing user.
    pub async fn save(&self, user: &User) -> Result<(), AppError> {
        match &self.backend {
            Backend::Mongo(users) => {
                users
                    .replace_one(doc! { "_id": user.id }, user)
                    .await
                    .map_err(|e| {
                        if is_duplicate_key(&e) {
                            AppError::Conflict("Email already in use.".to_string())
                        } else {
                            AppError::Database(e.to_string())
                        }
                    })?;
                Ok(())
            }
            Backend::Memory(map) => {
                let mut map = map.write().unwrap();
                if map
                    .values()
                    .any(|u| u.email == user.email && u.id != user.id)
                {
                    return Err(AppError::Conflict("Email already in use.".to_string()));
                }
                map.insert(user.id, user.clone());
                Ok(())
            }
        }
    }

    /// Delete a user by id.
    pub async fn delete(&self, id: &ObjectId) -> Result<(), AppError> {
        match &self.backend {
            Backend::Mongo(users) => {
                users
                    .delete_one(doc! { "_id": *id })
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(map) => {
                map.write().unwrap().remove(id);
                Ok(())
            }
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY,
        _ => false,
    }
}
