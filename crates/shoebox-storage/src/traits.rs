//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    /// A file with this key is already stored; keys are never overwritten.
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// The upload pipeline and the retrieval path only depend on this trait, so
/// tests can run against a temporary directory.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Store `data` under `storage_key`.
    ///
    /// Fails with `AlreadyExists` instead of replacing an existing file, and
    /// readers never observe a partially written file.
    async fn write(&self, storage_key: &str, data: Bytes) -> StorageResult<()>;

    /// Read a whole file. `NotFound` when absent.
    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Read a file as a stream of chunks. `NotFound` when absent.
    async fn read_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Get the size in bytes of a file, if it exists.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Time elapsed since the file was last modified.
    async fn age(&self, storage_key: &str) -> StorageResult<Duration>;

    /// Check that the backend is reachable and usable.
    async fn health_check(&self) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
