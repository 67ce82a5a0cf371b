//! Data models for the application
//!
//! `User` and `Privileges` are owned by the external auth store; `StoredFile`
//! is the ledger entry written once per accepted upload.

mod upload;
mod user;

pub use upload::*;
pub use user::*;
