// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NutriFit Accounts API Server
//!
//! Serves the account and authentication endpoints for the NutriFit app:
//! signup/login with JWT access tokens, refresh-token sessions in Redis,
//! and profile management on top of MongoDB.

use nutrifit_api::{
    config::Config,
    db::{SessionStore, UserDb},
    services::TokenService,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting NutriFit Accounts API");

    // Connect to MongoDB and ensure the unique email index exists
    let users = UserDb::connect(&config.database_url, &config.database_name)
        .await
        .expect("Failed to connect to MongoDB");

    // Connect to Redis for refresh-token sessions
    let sessions = SessionStore::connect(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");
    tracing::info!("Session store connected");

    // Token service shares the session store across all requests
    let tokens = TokenService::new(
        config.access_token_secret.clone(),
        config.refresh_token_secret.clone(),
        sessions,
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        users,
        tokens,
    });

    // Build router
    let app = nutrifit_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nutrifit_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
