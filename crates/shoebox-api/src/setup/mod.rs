//! Application setup and initialization

pub mod assets;
pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::middleware::RetrievalRateLimiter;
use crate::state::AppState;
use anyhow::{Context, Result};
use shoebox_core::Config;
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())?;

    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment(), "Configuration loaded and validated");

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let assets = assets::load_static_assets(&config).await?;

    let retrieval_limiter = if config.retrieval_rate_limit_enabled() {
        let fallback = assets::load_rate_limit_fallback(&config).await?;
        tracing::info!(
            max_requests = config.retrieval_rate_limit_max_requests(),
            window_secs = config.retrieval_rate_limit_window_secs(),
            "Retrieval rate limiting enabled"
        );
        Some(Arc::new(RetrievalRateLimiter::new(
            Duration::from_secs(config.retrieval_rate_limit_window_secs()),
            config.retrieval_rate_limit_max_requests(),
            fallback,
        )))
    } else {
        None
    };

    let state = services::initialize_services(&config, pool, storage, assets)?;
    let router = routes::build_router(state.clone(), retrieval_limiter);

    Ok((state, router))
}
