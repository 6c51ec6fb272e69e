//! Atelier application composition root
//!
//! Wires configuration, the database pool, and the external-service clients
//! into one `GenerationPipeline`.

use atelier_artifacts::repository::{ArtifactStore, PgArtifactStore};
use atelier_common::{db, telemetry, Config};
use atelier_genqueue::{GenQueueClient, GenQueueConfig};
use atelier_generations::GenerationPipeline;
use atelier_storage::{HttpProbe, StorageConfig, StorageUploader};
use sqlx::PgPool;
use std::sync::Arc;

/// Assemble the generation pipeline from configuration and an artifact
/// store. The store is injected so tests can run against an in-memory one.
pub fn create_pipeline(config: &Config, store: Arc<dyn ArtifactStore>) -> GenerationPipeline {
    let storage_config = StorageConfig::from_config(config);
    let queue_config = GenQueueConfig::from_config(config);

    GenerationPipeline::new(
        StorageUploader::new(storage_config),
        Arc::new(GenQueueClient::new(&queue_config)),
        store,
        Arc::new(HttpProbe::new()),
        &queue_config,
    )
}

/// Bootstrap the application from the environment: telemetry, config,
/// database pool, and a pipeline wired against Postgres.
pub async fn bootstrap() -> anyhow::Result<(Config, PgPool, GenerationPipeline)> {
    telemetry::init();

    let config = Config::from_env()?;
    let pool = db::connect(&config).await?;
    let store = Arc::new(PgArtifactStore::new(pool.clone()));
    let pipeline = create_pipeline(&config, store);

    tracing::info!(
        genqueue = %config.genqueue_base_url,
        poll_interval_ms = config.poll_interval_ms,
        "Generation pipeline assembled"
    );
    Ok((config, pool, pipeline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_artifacts::repository::InMemoryArtifactStore;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            storage_cloud_name: "atelier-test".to_string(),
            storage_upload_preset: "approved_media".to_string(),
            storage_base_url: Some("http://127.0.0.1:1".to_string()),
            genqueue_base_url: "http://127.0.0.1:1".to_string(),
            poll_interval_ms: 1,
            max_polls: 3,
            log_level: "info".to_string(),
            rust_log: "atelier=debug".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pipeline_assembles_from_config() {
        let store = Arc::new(InMemoryArtifactStore::new());
        let pipeline = create_pipeline(&test_config(), store);

        let page = pipeline.gallery("u1", None, 1, 12).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
    }

    #[tokio::test]
    async fn test_assembled_pipeline_validates_before_any_network_call() {
        // The configured endpoints are unreachable; validation must reject
        // the input before they matter
        let store = Arc::new(InMemoryArtifactStore::new());
        let pipeline = create_pipeline(&test_config(), store);

        let err = pipeline
            .approve_image("u1", "https://example.com/photo.png", None, None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
