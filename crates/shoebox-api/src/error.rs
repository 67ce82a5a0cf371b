//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>` (plain-text
//! client message) or, on the upload route, `Result<_, UploadRejection>`
//! (status only, empty body). Both log the full error at the level the
//! variant asks for.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shoebox_core::{AppError, ErrorMetadata, LogLevel};
use shoebox_storage::StorageError;

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from shoebox-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error(err))
    }
}

/// Rejection rendered as a bare status code.
///
/// ShareX shows the response body of a failed upload to the user, so nothing
/// about the failure goes back over the wire.
#[derive(Debug)]
pub struct UploadRejection(pub AppError);

impl From<AppError> for UploadRejection {
    fn from(err: AppError) -> Self {
        UploadRejection(err)
    }
}

/// Map a storage failure onto the application taxonomy.
pub fn storage_error(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(key) => AppError::NotFound(key),
        StorageError::InvalidKey(key) => AppError::NotFound(key),
        other => AppError::Storage(other.to_string()),
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, error_code, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, error_code, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type,
                error_code,
                "Request failed"
            );
        }
    }
}

fn status_of(error: &AppError) -> StatusCode {
    StatusCode::from_u16(error.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        log_error(app_error);
        (status_of(app_error), app_error.client_message()).into_response()
    }
}

impl IntoResponse for UploadRejection {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        log_error(app_error);
        status_of(app_error).into_response()
    }
}
