// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT issuance, verification, and refresh-session lifecycle.
//!
//! Access and refresh tokens are both HS256 JWTs signed with independent
//! secrets, so one kind never verifies as the other. Access tokens are
//! stateless and short-lived; refresh tokens are additionally registered in
//! the session store, which is what makes logout and account deletion able
//! to revoke them before their natural expiry.

use crate::db::SessionStore;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: usize = 15 * 60;
/// Refresh token lifetime: 7 days. Also the session key TTL and the refresh
/// cookie max-age.
pub const REFRESH_TOKEN_TTL_SECS: usize = 7 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id, ObjectId hex)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Issues and verifies tokens, and tracks refresh sessions.
#[derive(Clone)]
pub struct TokenService {
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
    pub sessions: SessionStore,
}

impl TokenService {
    pub fn new(access_secret: Vec<u8>, refresh_secret: Vec<u8>, sessions: SessionStore) -> Self {
        Self {
            access_secret,
            refresh_secret,
            sessions,
        }
    }

    /// Sign a 15-minute access token for the user. No side effects.
    pub fn sign_access_token(&self, user_id: &str) -> Result<String, AppError> {
        sign(user_id, ACCESS_TOKEN_TTL_SECS, &self.access_secret)
    }

    /// Sign a 7-day refresh token for the user. No side effects; the token
    /// is not valid for refresh until registered via [`register_session`].
    ///
    /// [`register_session`]: TokenService::register_session
    pub fn sign_refresh_token(&self, user_id: &str) -> Result<String, AppError> {
        sign(user_id, REFRESH_TOKEN_TTL_SECS, &self.refresh_secret)
    }

    /// Verify an access token's signature and expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AppError> {
        verify(token, &self.access_secret)
    }

    /// Verify a refresh token's signature and expiry. Membership in the
    /// session store is a separate check.
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        verify(token, &self.refresh_secret)
    }

    /// Append a refresh token to the user's session list. The key's TTL is
    /// set only when the key is first created; later logins ride on the
    /// original expiry. Two concurrent first logins can both observe a
    /// missing key and both set the TTL, which is harmless (same value).
    pub async fn register_session(&self, user_id: &str, token: &str) -> Result<(), AppError> {
        let key = session_key(user_id);
        let is_new = !self.sessions.exists(&key).await?;
        self.sessions.list_push(&key, token).await?;
        if is_new {
            self.sessions
                .expire(&key, REFRESH_TOKEN_TTL_SECS as i64)
                .await?;
        }
        Ok(())
    }

    /// Whether the refresh token is still in the user's session list.
    /// Absence means it was logged out, revoked, or never registered.
    pub async fn is_session_active(&self, user_id: &str, token: &str) -> Result<bool, AppError> {
        let tokens = self.sessions.list_range(&session_key(user_id)).await?;
        Ok(tokens.iter().any(|t| t == token))
    }

    /// Drop every refresh session for the user.
    pub async fn revoke_sessions(&self, user_id: &str) -> Result<(), AppError> {
        self.sessions.delete(&session_key(user_id)).await
    }
}

fn session_key(user_id: &str) -> String {
    format!("refreshTokens:{}", user_id)
}

fn sign(user_id: &str, ttl_secs: usize, secret: &[u8]) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Token signing failed: {}", e)))
}

fn verify(token: &str, secret: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(secret);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthenticated("Invalid or expired token.".to_string()))
}
