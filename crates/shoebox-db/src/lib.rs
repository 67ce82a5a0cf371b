//! Shoebox Database Layer
//!
//! Postgres repositories for the auth store and the upload ledger, plus the
//! traits the upload pipeline depends on.

// Module declarations
pub mod db;
pub mod store_traits;

// Re-exports
pub use db::{UploadRepository, UserRepository};
pub use store_traits::{UploadLedger, UserStore};
