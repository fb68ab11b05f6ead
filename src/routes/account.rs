// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes for authenticated users: profile, password, deletion.

use axum::{
    extract::State,
    routing::{delete, get, patch},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::ValidateEmail;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::routes::auth::removal_cookie;
use crate::routes::MessageResponse;
use crate::services::password;
use crate::AppState;

/// Account routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/update-password", patch(update_password))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/delete-account", delete(delete_account))
}

// ─── Profile ─────────────────────────────────────────────────

/// Full profile view returned by the profile endpoints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_recommended: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_recommended: Option<f64>,
    pub created_at: String,
}

impl From<&User> for ProfilePayload {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            birthdate: user.birthdate.clone(),
            sex: user.sex.clone(),
            height: user.height,
            weight: user.weight,
            target_weight: user.target_weight,
            activity_level: user.activity_level.clone(),
            fitness_goal: user.fitness_goal.clone(),
            dietary_preferences: user.dietary_preferences.clone(),
            calories_recommended: user.calories_recommended,
            protein_recommended: user.protein_recommended,
            created_at: user.created_at.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: ProfilePayload,
}

/// Get the current user's profile.
async fn get_profile(Extension(auth): Extension<AuthUser>) -> Result<Json<ProfileResponse>> {
    Ok(Json(ProfileResponse {
        message: "User profile retrieved successfully.".to_string(),
        user: ProfilePayload::from(&auth.user),
    }))
}

/// Partial profile update.
///
/// A field is applied iff it is present in the request body, so zero and
/// empty values are legitimate updates rather than "keep the old value".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<String>,
    pub sex: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub activity_level: Option<String>,
    pub fitness_goal: Option<String>,
    pub dietary_preferences: Option<Vec<String>>,
    pub calories_recommended: Option<f64>,
    pub protein_recommended: Option<f64>,
}

/// Update only the provided profile fields.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let mut user = auth.user;

    if let Some(first_name) = body.first_name {
        user.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = body.last_name {
        user.last_name = last_name.trim().to_string();
    }
    if let Some(email) = body.email {
        let email = email.trim().to_lowercase();
        if !email.validate_email() {
            return Err(AppError::InvalidInput("Invalid Email.".to_string()));
        }
        user.email = email;
    }
    if let Some(birthdate) = body.birthdate {
        user.birthdate = Some(birthdate);
    }
    if let Some(sex) = body.sex {
        user.sex = Some(sex);
    }
    if let Some(height) = body.height {
        user.height = Some(height);
    }
    if let Some(weight) = body.weight {
        user.weight = Some(weight);
    }
    if let Some(target_weight) = body.target_weight {
        user.target_weight = Some(target_weight);
    }
    if let Some(activity_level) = body.activity_level {
        user.activity_level = Some(activity_level);
    }
    if let Some(fitness_goal) = body.fitness_goal {
        user.fitness_goal = Some(fitness_goal);
    }
    if let Some(dietary_preferences) = body.dietary_preferences {
        user.dietary_preferences = Some(dietary_preferences);
    }
    if let Some(calories_recommended) = body.calories_recommended {
        user.calories_recommended = Some(calories_recommended);
    }
    if let Some(protein_recommended) = body.protein_recommended {
        user.protein_recommended = Some(protein_recommended);
    }

    user.updated_at = chrono::Utc::now().to_rfc3339();
    state.users.save(&user).await?;

    Ok(Json(ProfileResponse {
        message: "Profile updated successfully.".to_string(),
        user: ProfilePayload::from(&user),
    }))
}

// ─── Password ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub password_confirm: Option<String>,
}

/// Change the current user's password.
///
/// Recording the change time invalidates every access token issued before
/// it; the one-second skew keeps tokens signed in the same second working.
async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let (Some(current), Some(new), Some(confirm)) = (
        body.current_password,
        body.new_password,
        body.password_confirm,
    ) else {
        return Err(AppError::InvalidInput("All fields are required.".to_string()));
    };

    if new != confirm {
        return Err(AppError::InvalidInput(
            "New passwords do not match.".to_string(),
        ));
    }
    if new.len() < 8 {
        return Err(AppError::InvalidInput(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let mut user = auth.user;
    if !password::verify_password(current, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized(
            "Incorrect current password.".to_string(),
        ));
    }

    user.password_hash = password::hash_password(new).await?;
    user.password_changed_at = Some(chrono::Utc::now().timestamp() - 1);
    user.updated_at = chrono::Utc::now().to_rfc3339();
    state.users.save(&user).await?;

    tracing::info!(user_id = %user.id, "Password updated");

    Ok(Json(MessageResponse {
        message: "Password updated successfully!".to_string(),
    }))
}

// ─── Account Deletion ────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    pub current_password: Option<String>,
}

/// Delete the current user's account after a password confirmation.
/// Outstanding refresh sessions die with the account.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    jar: CookieJar,
    Json(body): Json<DeleteAccountRequest>,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    let current = body.current_password.ok_or_else(|| {
        AppError::InvalidInput("Current password is required.".to_string())
    })?;

    let user = auth.user;
    if !password::verify_password(current, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized(
            "Incorrect password. Account deletion failed.".to_string(),
        ));
    }

    state.users.delete(&user.id).await?;
    state.tokens.revoke_sessions(&user.id.to_hex()).await?;

    tracing::info!(user_id = %user.id, "Account deleted");

    let jar = jar.remove(removal_cookie(&state.config));

    Ok((
        jar,
        Json(MessageResponse {
            message: "Account deleted successfully.".to_string(),
        }),
    ))
}
