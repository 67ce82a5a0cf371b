//! Shoebox Storage Library
//!
//! Blob storage for uploaded files. Keys are the generated file names
//! (`<token>.<extension>`) and live flat under the storage root: a key never
//! contains a path separator or `..`.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use shoebox_core::StorageBackend;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
