//! Shoebox API Library
//!
//! ShareX-compatible upload endpoint and static file server.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::{HttpAppError, UploadRejection};
pub use state::{AppState, StaticAssets};
