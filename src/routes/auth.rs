// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication routes: signup, login, logout, token refresh.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::bearer_token;
use crate::models::{Role, User};
use crate::routes::MessageResponse;
use crate::services::password;
use crate::services::tokens::REFRESH_TOKEN_TTL_SECS;
use crate::AppState;

/// Name of the httpOnly cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh-token", post(refresh_token))
}

// ─── Request/Response Types ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 3, message = "First name must be at least 3 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 3, message = "Last name must be at least 3 characters"))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub birthdate: Option<String>,
    pub sex: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub activity_level: Option<String>,
    pub fitness_goal: Option<String>,
    pub dietary_preferences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of a successful signup or login.
#[derive(Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    /// Authorization-style bearer value for the access token
    pub token: String,
    pub data: AuthData,
}

#[derive(Serialize)]
pub struct AuthData {
    pub user: UserSummary,
}

/// Sanitized user object returned on signup/login.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

// ─── Handlers ────────────────────────────────────────────────

/// Register a new account and log it in.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SignupRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let email = body
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .ok_or_else(|| AppError::InvalidInput("Please enter your email".to_string()))?;

    // Duplicate check runs before format validation
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already in use.".to_string()));
    }

    if !email.validate_email() {
        return Err(AppError::InvalidInput("Invalid Email.".to_string()));
    }

    body.validate()
        .map_err(|e| AppError::InvalidInput(validation_message(&e)))?;

    let first_name = body
        .first_name
        .as_deref()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| AppError::InvalidInput("Please enter your first name".to_string()))?;
    let last_name = body
        .last_name
        .as_deref()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| AppError::InvalidInput("Please enter your last name".to_string()))?;
    let password = body
        .password
        .clone()
        .ok_or_else(|| AppError::InvalidInput("Please enter your password".to_string()))?;
    let password_confirm = body
        .password_confirm
        .clone()
        .ok_or_else(|| AppError::InvalidInput("Please confirm your password".to_string()))?;

    if password != password_confirm {
        return Err(AppError::InvalidInput("Passwords do not match!".to_string()));
    }

    let password_hash = password::hash_password(password).await?;
    let now = chrono::Utc::now().to_rfc3339();

    let user = User {
        id: ObjectId::new(),
        first_name,
        last_name,
        email,
        password_hash,
        // Only set on later changes; a fresh account's tokens are never stale
        password_changed_at: None,
        role: Role::default(),
        birthdate: body.birthdate,
        sex: body.sex,
        height: body.height,
        weight: body.weight,
        target_weight: body.target_weight,
        activity_level: body.activity_level,
        fitness_goal: body.fitness_goal,
        dietary_preferences: body.dietary_preferences,
        calories_recommended: None,
        protein_recommended: None,
        created_at: now.clone(),
        updated_at: now,
    };

    let user = state.users.insert(user).await?;

    tracing::info!(user_id = %user.id, "New account created");

    issue_session(&state, jar, &user).await
}

/// Log in with email and password.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::InvalidInput(
            "Please provide email and password".to_string(),
        ));
    };
    let email = email.trim().to_lowercase();

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !password::verify_password(password, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized(
            "Incorrect Email or Password".to_string(),
        ));
    }

    issue_session(&state, jar, &user).await
}

/// Log out: revoke the caller's refresh sessions if a valid access token
/// accompanies the request, and clear the cookie either way.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    if let Some(token) = bearer_token(&headers) {
        if let Ok(claims) = state.tokens.verify_access_token(&token) {
            state.tokens.revoke_sessions(&claims.sub).await?;
            tracing::debug!(user_id = %claims.sub, "Refresh sessions revoked");
        }
    }

    let jar = jar.remove(removal_cookie(&state.config));

    Ok((
        jar,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// Exchange the refresh cookie for a new access token.
///
/// The refresh token itself is not rotated; it stays valid until logout or
/// its 7-day expiry, and the cookie is left untouched.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<RefreshResponse>> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Unauthenticated("No refresh token provided.".to_string()))?;

    let claims = state
        .tokens
        .verify_refresh_token(&token)
        .map_err(|_| AppError::Unauthenticated("Token refresh failed.".to_string()))?;

    // A verified signature is not enough: the token must still be registered.
    // Absence means logout or revocation beat this request.
    if !state.tokens.is_session_active(&claims.sub, &token).await? {
        return Err(AppError::Forbidden(
            "Invalid or expired refresh token.".to_string(),
        ));
    }

    let access_token = state.tokens.sign_access_token(&claims.sub)?;

    Ok(Json(RefreshResponse { access_token }))
}

// ─── Login Response Protocol ─────────────────────────────────

/// Issue both tokens for the user, register the refresh session, set the
/// refresh cookie, and build the success body. Shared by signup and login.
pub(crate) async fn issue_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user_id = user.id.to_hex();

    let access_token = state.tokens.sign_access_token(&user_id)?;
    let refresh_token = state.tokens.sign_refresh_token(&user_id)?;
    state.tokens.register_session(&user_id, &refresh_token).await?;

    let jar = jar.add(refresh_cookie(refresh_token, &state.config));

    Ok((
        jar,
        Json(AuthResponse {
            status: "success",
            token: format!("Bearer {}", access_token),
            data: AuthData {
                user: UserSummary {
                    id: user_id,
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    email: user.email.clone(),
                },
            },
        }),
    ))
}

fn refresh_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.production)
        .max_age(time::Duration::seconds(REFRESH_TOKEN_TTL_SECS as i64))
        .build()
}

/// Removal cookie matching the attributes the refresh cookie was set with.
pub(crate) fn removal_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.production)
        .build()
}

fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid input".to_string())
}
