//! Error types module
//!
//! All failures of the upload and retrieval paths are unified under `AppError`.
//! Each variant self-describes how it is presented over HTTP through the
//! `ErrorMetadata` trait, so the API layer only has to render it.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected rejections (bad headers, spoofed content, unknown token)
    Debug,
    /// Suspicious but recoverable conditions
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "CONTENT_MISMATCH")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or invalid headers, missing body, size outside the accepted bounds.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// No active user matches the presented token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Declared content type is not in the signature registry.
    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),

    /// Body bytes do not satisfy the signature of the declared content type.
    #[error("Content does not match declared type {0}")]
    ContentMismatch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored file whose extension has no registered content type.
    #[error("Unrecognized file extension: {0}")]
    UnknownExtension(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::MalformedRequest(_) => (400, "MALFORMED_REQUEST", false, LogLevel::Debug),
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, LogLevel::Debug),
        AppError::UnsupportedType(_) => (400, "UNSUPPORTED_TYPE", false, LogLevel::Debug),
        // Spoofing attempts are worth seeing in the default log output.
        AppError::ContentMismatch(_) => (400, "CONTENT_MISMATCH", false, LogLevel::Warn),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::UnknownExtension(_) => (400, "UNKNOWN_EXTENSION", false, LogLevel::Warn),
        AppError::Database(_) => (500, "DATABASE_ERROR", true, LogLevel::Error),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MalformedRequest(_) => "MalformedRequest",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::UnsupportedType(_) => "UnsupportedType",
            AppError::ContentMismatch(_) => "ContentMismatch",
            AppError::NotFound(_) => "NotFound",
            AppError::UnknownExtension(_) => "UnknownExtension",
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MalformedRequest(ref msg) => msg.clone(),
            AppError::Unauthorized(_) => "Unauthorized".to_string(),
            AppError::UnsupportedType(ref mime) => format!("Unsupported file type: {}", mime),
            AppError::ContentMismatch(_) => {
                "File contents do not match the declared type".to_string()
            }
            AppError::NotFound(_) => "file not found".to_string(),
            AppError::UnknownExtension(_) => "Unrecognized file type".to_string(),
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
