//! Wire repositories, storage and the upload pipeline into `AppState`.

use crate::services::{UploadPipeline, UploadPolicy};
use crate::state::{AppState, StaticAssets};
use anyhow::Result;
use shoebox_core::{Config, SignatureRegistry};
use shoebox_db::{UploadRepository, UserRepository};
use shoebox_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
    assets: StaticAssets,
) -> Result<Arc<AppState>> {
    let registry = Arc::new(SignatureRegistry::standard());
    let users = Arc::new(UserRepository::new(pool.clone()));
    let ledger = Arc::new(UploadRepository::new(pool));
    let policy = UploadPolicy::from_config(config)?;

    tracing::info!(
        mime_types = %registry.mime_types().collect::<Vec<_>>().join(","),
        size_check = %policy.size_check,
        developer_signature_bypass = policy.developer_signature_bypass,
        "Upload pipeline configured"
    );

    let upload = Arc::new(UploadPipeline::new(
        registry.clone(),
        storage.clone(),
        users,
        ledger.clone(),
        policy,
        config.public_host(),
    ));

    Ok(Arc::new(AppState {
        registry,
        storage,
        ledger,
        upload,
        assets,
    }))
}
