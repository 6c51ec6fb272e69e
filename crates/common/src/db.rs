//! Shared database helpers for Atelier

use crate::config::Config;
use sqlx::PgPool;

/// Connect a Postgres pool from configuration.
pub async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(&config.database_url).await.map_err(|e| {
        tracing::error!("Failed to connect to database: {}", e);
        anyhow::anyhow!("Database connection failed: {}", e)
    })?;

    tracing::info!("Database connection established");
    Ok(pool)
}
