//! Configuration module
//!
//! Process-wide settings loaded once from the environment (after an optional
//! `.env` file) and treated as immutable afterwards.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use regex::Regex;

use crate::storage_types::StorageBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const RETRIEVAL_MAX_REQUESTS: u32 = 15;
const RETRIEVAL_WINDOW_SECS: u64 = 60;
pub const UPLOAD_MIN_BYTES: u64 = 0x40;
pub const UPLOAD_MAX_BYTES: u64 = 0x400 * 0x400 * 0x400;
pub const SHAREX_USER_AGENT_PATTERN: &str = r"^ShareX/\d+\.\d+\.\d+$";

/// When the declared `Content-Length` is checked against the size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeCheck {
    /// Reject oversize or undersize requests before touching the auth store.
    #[default]
    BeforeAuth,
    /// Only authenticated users learn that their upload has the wrong size.
    AfterAuth,
    /// No size bounds beyond the body read limit.
    Off,
}

impl FromStr for SizeCheck {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "before_auth" => Ok(SizeCheck::BeforeAuth),
            "after_auth" => Ok(SizeCheck::AfterAuth),
            "off" | "none" | "disabled" => Ok(SizeCheck::Off),
            _ => Err(anyhow::anyhow!("Invalid upload size check: {}", s)),
        }
    }
}

impl Display for SizeCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SizeCheck::BeforeAuth => write!(f, "before_auth"),
            SizeCheck::AfterAuth => write!(f, "after_auth"),
            SizeCheck::Off => write!(f, "off"),
        }
    }
}

/// Settings shared by every process of the service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Upload endpoint and file server configuration
#[derive(Clone, Debug)]
pub struct ShoeboxConfig {
    pub base: BaseConfig,
    pub database_url: String,
    /// Host part of the URLs handed back to clients.
    pub public_host: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    // Static assets, read once at startup
    pub favicon_path: String,
    pub rate_limited_image_path: String,
    pub rate_limited_content_type: String,
    // Retrieval rate limiting
    pub retrieval_rate_limit_enabled: bool,
    pub retrieval_rate_limit_max_requests: u32,
    pub retrieval_rate_limit_window_secs: u64,
    // Upload policy
    pub upload_min_bytes: u64,
    pub upload_max_bytes: u64,
    pub upload_size_check: SizeCheck,
    pub upload_user_agent_pattern: String,
    /// Let DEVELOPMENT users skip the content signature check for registered types.
    pub upload_developer_signature_bypass: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ShoeboxConfig>);

impl Config {
    fn inner(&self) -> &ShoeboxConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ShoeboxConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn public_host(&self) -> &str {
        &self.inner().public_host
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn favicon_path(&self) -> &str {
        &self.inner().favicon_path
    }

    pub fn rate_limited_image_path(&self) -> &str {
        &self.inner().rate_limited_image_path
    }

    pub fn rate_limited_content_type(&self) -> &str {
        &self.inner().rate_limited_content_type
    }

    pub fn retrieval_rate_limit_enabled(&self) -> bool {
        self.inner().retrieval_rate_limit_enabled
    }

    pub fn retrieval_rate_limit_max_requests(&self) -> u32 {
        self.inner().retrieval_rate_limit_max_requests
    }

    pub fn retrieval_rate_limit_window_secs(&self) -> u64 {
        self.inner().retrieval_rate_limit_window_secs
    }

    pub fn upload_min_bytes(&self) -> u64 {
        self.inner().upload_min_bytes
    }

    pub fn upload_max_bytes(&self) -> u64 {
        self.inner().upload_max_bytes
    }

    pub fn upload_size_check(&self) -> SizeCheck {
        self.inner().upload_size_check
    }

    pub fn upload_user_agent_pattern(&self) -> &str {
        &self.inner().upload_user_agent_pattern
    }

    pub fn upload_developer_signature_bypass(&self) -> bool {
        self.inner().upload_developer_signature_bypass
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

impl ShoeboxConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Local,
        };

        let upload_size_check = match env::var("UPLOAD_SIZE_CHECK") {
            Ok(value) => value.parse()?,
            Err(_) => SizeCheck::default(),
        };

        let config = ShoeboxConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            public_host: env::var("PUBLIC_HOST")
                .map_err(|_| anyhow::anyhow!("PUBLIC_HOST must be set"))?,
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./static".to_string()),
            favicon_path: env::var("FAVICON_PATH").unwrap_or_else(|_| "./favicon.ico".to_string()),
            rate_limited_image_path: env::var("RATE_LIMITED_IMAGE_PATH")
                .unwrap_or_else(|_| "./disappointed.jpeg".to_string()),
            rate_limited_content_type: env::var("RATE_LIMITED_CONTENT_TYPE")
                .unwrap_or_else(|_| "image/jpeg".to_string()),
            retrieval_rate_limit_enabled: env_flag("RETRIEVAL_RATE_LIMIT_ENABLED", true),
            retrieval_rate_limit_max_requests: env::var("RETRIEVAL_RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| RETRIEVAL_MAX_REQUESTS.to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("RETRIEVAL_RATE_LIMIT_MAX_REQUESTS must be a valid number")
                })?,
            retrieval_rate_limit_window_secs: env::var("RETRIEVAL_RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| RETRIEVAL_WINDOW_SECS.to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("RETRIEVAL_RATE_LIMIT_WINDOW_SECS must be a valid number")
                })?,
            upload_min_bytes: env::var("UPLOAD_MIN_BYTES")
                .unwrap_or_else(|_| UPLOAD_MIN_BYTES.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("UPLOAD_MIN_BYTES must be a valid number"))?,
            upload_max_bytes: env::var("UPLOAD_MAX_BYTES")
                .unwrap_or_else(|_| UPLOAD_MAX_BYTES.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("UPLOAD_MAX_BYTES must be a valid number"))?,
            upload_size_check,
            upload_user_agent_pattern: env::var("UPLOAD_USER_AGENT_PATTERN")
                .unwrap_or_else(|_| SHAREX_USER_AGENT_PATTERN.to_string()),
            upload_developer_signature_bypass: env_flag("UPLOAD_DEVELOPER_SIGNATURE_BYPASS", false),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
        }

        if self.public_host.trim().is_empty() {
            return Err(anyhow::anyhow!("PUBLIC_HOST must not be empty"));
        }

        if self.upload_min_bytes >= self.upload_max_bytes {
            return Err(anyhow::anyhow!(
                "UPLOAD_MIN_BYTES ({}) must be lower than UPLOAD_MAX_BYTES ({})",
                self.upload_min_bytes,
                self.upload_max_bytes
            ));
        }

        if self.retrieval_rate_limit_enabled {
            if self.retrieval_rate_limit_max_requests == 0 {
                return Err(anyhow::anyhow!(
                    "RETRIEVAL_RATE_LIMIT_MAX_REQUESTS must be greater than 0"
                ));
            }
            if self.retrieval_rate_limit_window_secs == 0 {
                return Err(anyhow::anyhow!(
                    "RETRIEVAL_RATE_LIMIT_WINDOW_SECS must be greater than 0"
                ));
            }
        }

        Regex::new(&self.upload_user_agent_pattern).map_err(|e| {
            anyhow::anyhow!("UPLOAD_USER_AGENT_PATTERN is not a valid regex: {}", e)
        })?;

        match self.storage_backend {
            StorageBackend::Local => {
                if self.local_storage_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
