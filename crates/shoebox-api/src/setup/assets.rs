//! Static payloads read once at startup

use crate::middleware::FallbackPayload;
use crate::state::StaticAssets;
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use bytes::Bytes;
use shoebox_core::Config;

async fn read_asset(path: &str, what: &str) -> Result<Bytes> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {} from {}", what, path))?;
    tracing::debug!(path, size = bytes.len(), "Loaded {}", what);
    Ok(Bytes::from(bytes))
}

pub async fn load_static_assets(config: &Config) -> Result<StaticAssets> {
    let favicon = read_asset(config.favicon_path(), "favicon").await?;
    Ok(StaticAssets { favicon })
}

/// Payload served in place of a file while retrieval is rate limited.
pub async fn load_rate_limit_fallback(config: &Config) -> Result<FallbackPayload> {
    let body = read_asset(config.rate_limited_image_path(), "rate limit image").await?;
    let content_type = HeaderValue::from_str(config.rate_limited_content_type())
        .context("RATE_LIMITED_CONTENT_TYPE is not a valid header value")?;
    Ok(FallbackPayload { body, content_type })
}
