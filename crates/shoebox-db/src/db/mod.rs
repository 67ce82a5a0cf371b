//! Database repositories for data access layer
//!
//! `users` is owned by the external auth store and only read here; `uploads`
//! is the append-only ledger of accepted files.

pub mod upload;
pub mod user;

pub use upload::UploadRepository;
pub use user::UserRepository;
