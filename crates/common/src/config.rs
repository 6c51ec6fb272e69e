//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Storage account identifiers
//! are injected here rather than compiled in as process-wide literals.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,

    /// Durable object storage account
    pub storage_cloud_name: String,
    pub storage_upload_preset: String,
    /// Base URL override for the storage upload API (tests point this at a
    /// local server; production leaves it unset)
    pub storage_base_url: Option<String>,

    /// Generation queue intermediary
    pub genqueue_base_url: String,

    /// Polling behavior
    pub poll_interval_ms: u64,
    pub max_polls: u32,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            storage_cloud_name: env::var("STORAGE_CLOUD_NAME")
                .map_err(|_| anyhow::anyhow!("STORAGE_CLOUD_NAME is required"))?,
            storage_upload_preset: env::var("STORAGE_UPLOAD_PRESET")
                .map_err(|_| anyhow::anyhow!("STORAGE_UPLOAD_PRESET is required"))?,
            storage_base_url: env::var("STORAGE_BASE_URL").ok(),

            genqueue_base_url: env::var("GENQUEUE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000".to_string()),

            poll_interval_ms: env::var("POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .unwrap_or(2000),
            max_polls: env::var("MAX_POLLS")
                .unwrap_or_else(|_| "150".to_string())
                .parse()
                .unwrap_or(150),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "atelier=debug".to_string()),
        };

        Ok(config)
    }
}
