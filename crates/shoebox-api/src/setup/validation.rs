//! Configuration validation
//!
//! Hard errors come from `Config::validate`; this adds warnings for settings
//! that are legal but probably not what a production deployment wants.

use anyhow::Result;
use shoebox_core::{Config, SizeCheck};

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if !config.is_production() {
        return Ok(());
    }

    if config.upload_developer_signature_bypass() {
        tracing::warn!(
            "UPLOAD_DEVELOPER_SIGNATURE_BYPASS is enabled - DEVELOPMENT users can store unverified content"
        );
    }

    if config.upload_size_check() == SizeCheck::Off {
        tracing::warn!("UPLOAD_SIZE_CHECK=off - declared upload sizes are not enforced");
    }

    if !config.retrieval_rate_limit_enabled() {
        tracing::warn!("Retrieval rate limiting is disabled");
    }

    Ok(())
}
