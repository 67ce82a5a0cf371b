//! Upload acceptance policy

use regex::Regex;
use shoebox_core::{Config, SizeCheck};

/// Tunables of the upload pipeline that deployments disagree on.
#[derive(Clone, Debug)]
pub struct UploadPolicy {
    /// Inclusive lower bound on the declared body size.
    pub min_bytes: u64,
    /// Exclusive upper bound on the declared body size; also the body read limit.
    pub max_bytes: u64,
    pub size_check: SizeCheck,
    /// Pattern the `User-Agent` header must match.
    pub user_agent: Regex,
    /// Accept bodies that fail their signature check from DEVELOPMENT users.
    pub developer_signature_bypass: bool,
}

impl UploadPolicy {
    pub fn new(
        min_bytes: u64,
        max_bytes: u64,
        size_check: SizeCheck,
        user_agent_pattern: &str,
        developer_signature_bypass: bool,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            min_bytes,
            max_bytes,
            size_check,
            user_agent: Regex::new(user_agent_pattern)?,
            developer_signature_bypass,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        Self::new(
            config.upload_min_bytes(),
            config.upload_max_bytes(),
            config.upload_size_check(),
            config.upload_user_agent_pattern(),
            config.upload_developer_signature_bypass(),
        )
        .map_err(|e| anyhow::anyhow!("Invalid UPLOAD_USER_AGENT_PATTERN: {}", e))
    }

    pub fn accepts_size(&self, size: u64) -> bool {
        self.min_bytes <= size && size < self.max_bytes
    }

    /// Largest body the pipeline will buffer.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_bytes).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoebox_core::config::{SHAREX_USER_AGENT_PATTERN, UPLOAD_MAX_BYTES, UPLOAD_MIN_BYTES};

    fn sharex() -> UploadPolicy {
        UploadPolicy::new(
            UPLOAD_MIN_BYTES,
            UPLOAD_MAX_BYTES,
            SizeCheck::BeforeAuth,
            SHAREX_USER_AGENT_PATTERN,
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_size_bounds_are_half_open() {
        let policy = sharex();
        assert!(!policy.accepts_size(63));
        assert!(policy.accepts_size(64));
        assert!(policy.accepts_size((1 << 30) - 1));
        assert!(!policy.accepts_size(1 << 30));
    }

    #[test]
    fn test_user_agent_pattern() {
        let policy = sharex();
        assert!(policy.user_agent.is_match("ShareX/13.7.0"));
        assert!(!policy.user_agent.is_match("ShareX/13.7"));
        assert!(!policy.user_agent.is_match("curl/8.0.1"));
        assert!(!policy.user_agent.is_match("Mozilla/5.0 ShareX/13.7.0"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(UploadPolicy::new(1, 2, SizeCheck::Off, "(", false).is_err());
    }
}
