use anyhow::{Context, Result};
use shoebox_core::Config;
use shoebox_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage")?;

    tracing::info!(
        backend = %storage.backend_type(),
        path = %config.local_storage_path(),
        "Storage initialized"
    );

    Ok(storage)
}
