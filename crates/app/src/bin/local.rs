// Atelier - local pipeline runner

use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, _pool, _pipeline) = atelier_app::bootstrap().await.map_err(|e| {
        error!("Failed to bootstrap application: {}", e);
        e
    })?;

    info!(
        genqueue = %config.genqueue_base_url,
        "Atelier pipeline running; press Ctrl+C to stop"
    );

    signal::ctrl_c().await?;
    info!("Received Ctrl+C signal, shutting down");
    Ok(())
}
