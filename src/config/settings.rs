//! Application settings loaded from environment variables.

use std::env;

use super::constants::{DEFAULT_DATABASE_NAME, DEFAULT_MONGODB_URI};

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub database_name: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("mongodb_uri", &"[REDACTED]")
            .field("database_name", &self.database_name)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// local-development defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            mongodb_uri: env::var("MONGODB_URI").unwrap_or_else(|_| DEFAULT_MONGODB_URI.to_string()),
            database_name: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| DEFAULT_DATABASE_NAME.to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mongodb_uri: DEFAULT_MONGODB_URI.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
        }
    }
}
