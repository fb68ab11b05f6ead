//! User model for storage and API.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// User record stored in MongoDB.
///
/// The password hash is part of the stored document but is never exposed:
/// every API response goes through a dedicated DTO that omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document id; its hex form is the JWT subject
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address (unique, stored lowercased)
    pub email: String,
    /// Argon2id hash of the password
    pub password_hash: String,
    /// Unix seconds of the last password change; None until the first change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<i64>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitness_goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_preferences: Option<Vec<String>>,
    /// Derived nutrition target (kcal/day)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_recommended: Option<f64>,
    /// Derived nutrition target (g/day)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_recommended: Option<f64>,
    /// When the account was created (RFC 3339)
    pub created_at: String,
    /// Last modification time (RFC 3339)
    pub updated_at: String,
}

impl User {
    /// Whether the password was changed after a token with this issue time
    /// was signed. Tokens issued in the same second as the change survive;
    /// the writer records the change time with a one-second skew for that.
    pub fn password_changed_after(&self, token_iat: usize) -> bool {
        match self.password_changed_at {
            Some(changed_at) => changed_at > token_iat as i64,
            None => false,
        }
    }
}
