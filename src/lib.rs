// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! NutriFit Accounts: user accounts and authentication backend
//!
//! This crate provides the account API for the NutriFit app: signup, login,
//! token refresh, password changes, profile management, and account deletion,
//! backed by MongoDB for user records and Redis for refresh-token sessions.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::UserDb;
use services::TokenService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: UserDb,
    pub tokens: TokenService,
}
