// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.
//!
//! Verifies the bearer access token, resolves the user, and rejects tokens
//! issued before the user's last password change. Access tokens carry no
//! server-side state, so the password-change check is what invalidates them
//! early; everything else rides on the 15-minute expiry.

use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

/// Authenticated user attached to the request by [`require_auth`].
///
/// Carries the resolved record; responses built from it go through DTOs
/// that never serialize the password hash.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthenticated("Not authorized, no token.".to_string()))?;

    let claims = state
        .tokens
        .verify_access_token(&token)
        .map_err(|_| AppError::Unauthenticated("Not authorized, token failed.".to_string()))?;

    let user_id = ObjectId::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthenticated("Not authorized, token failed.".to_string()))?;

    let user = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User not found.".to_string()))?;

    if user.password_changed_after(claims.iat) {
        return Err(AppError::Unauthenticated(
            "Password changed. Please log in again.".to_string(),
        ));
    }

    request.extensions_mut().insert(AuthUser { user });

    Ok(next.run(request).await)
}
