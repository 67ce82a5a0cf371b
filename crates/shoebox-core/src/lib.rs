//! Shoebox Core Library
//!
//! Domain models, error types, configuration and the file signature registry
//! shared by the storage, database and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod signature;
pub mod storage_types;
pub mod units;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ShoeboxConfig, SizeCheck};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use signature::{RegistryError, SignaturePredicate, SignatureRegistry, SignatureRule};
pub use storage_types::StorageBackend;
pub use units::format_bytes;
// Storage, StorageError and StorageResult live in shoebox-storage
