//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup into an explicit struct; nothing else
//! in the crate touches the process environment.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Allowed CORS origin (the frontend)
    pub cors_origin: String,
    /// MongoDB connection string
    pub database_url: String,
    /// MongoDB database name
    pub database_name: String,
    /// Redis connection URL for the session token store
    pub redis_url: String,
    /// HS256 signing secret for access tokens (raw bytes)
    pub access_token_secret: Vec<u8>,
    /// HS256 signing secret for refresh tokens (raw bytes)
    pub refresh_token_secret: Vec<u8>,
    /// Production flag; controls the refresh cookie's `Secure` attribute
    pub production: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present. The two JWT secrets and
    /// the database URL are required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "nutrifit".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1/".to_string()),
            access_token_secret: env::var("JWT_ACCESS_TOKEN")
                .map_err(|_| ConfigError::Missing("JWT_ACCESS_TOKEN"))?
                .into_bytes(),
            refresh_token_secret: env::var("JWT_REFRESH_TOKEN")
                .map_err(|_| ConfigError::Missing("JWT_REFRESH_TOKEN"))?
                .into_bytes(),
            production: env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 5000,
            cors_origin: "http://localhost:3000".to_string(),
            database_url: "mongodb://localhost:27017".to_string(),
            database_name: "nutrifit-test".to_string(),
            redis_url: "redis://127.0.0.1/".to_string(),
            access_token_secret: b"test_access_key_32_bytes_minimum".to_vec(),
            refresh_token_secret: b"test_refresh_key_32_bytes_minimm".to_vec(),
            production: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
