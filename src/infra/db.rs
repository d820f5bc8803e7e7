//! Database connection bootstrap.

use mongodb::{Client, Database};

use crate::config::AppConfig;
use crate::errors::AppResult;

/// Connect to MongoDB and open the configured database.
pub async fn connect(config: &AppConfig) -> AppResult<Database> {
    let client = Client::with_uri_str(&config.mongodb_uri).await?;
    tracing::info!(database = %config.database_name, "connected to MongoDB");
    Ok(client.database(&config.database_name))
}
