//! Repository trait abstractions for the upload pipeline
//!
//! These traits define the minimal interface the pipeline needs from the
//! database, allowing for mocking and testing without a Postgres instance.

use async_trait::async_trait;
use shoebox_core::error::AppError;
use shoebox_core::models::{StoredFile, User};

use crate::db::{UploadRepository, UserRepository};

/// Token lookup against the auth store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Resolve `token` to an active user. `Ok(None)` when no active user owns it.
    async fn find_active_by_token(&self, token: &str) -> Result<Option<User>, AppError>;
}

/// Append-only record of accepted uploads
#[async_trait]
pub trait UploadLedger: Send + Sync {
    async fn record(&self, file: &StoredFile) -> Result<(), AppError>;

    /// Cheap round trip used by readiness probes.
    async fn ping(&self) -> Result<(), AppError>;
}

// Implementations for concrete repository types

#[async_trait]
impl UserStore for UserRepository {
    async fn find_active_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        UserRepository::find_active_by_token(self, token).await
    }
}

#[async_trait]
impl UploadLedger for UploadRepository {
    async fn record(&self, file: &StoredFile) -> Result<(), AppError> {
        UploadRepository::record(self, file).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        UploadRepository::ping(self).await
    }
}
