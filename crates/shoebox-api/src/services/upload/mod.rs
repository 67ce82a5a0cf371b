//! Upload service
//!
//! `UploadPipeline` owns the accept/reject decision for `POST /`; the handler
//! only adapts it to HTTP.

mod pipeline;
mod policy;

pub use pipeline::{AcceptedUpload, UploadHeaders, UploadPipeline};
pub use policy::UploadPolicy;
