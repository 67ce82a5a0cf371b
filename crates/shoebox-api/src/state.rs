//! Application state shared by all handlers.

use crate::services::UploadPipeline;
use bytes::Bytes;
use shoebox_core::SignatureRegistry;
use shoebox_db::UploadLedger;
use shoebox_storage::Storage;
use std::sync::Arc;

/// Opaque bytes loaded once at startup.
#[derive(Clone, Debug)]
pub struct StaticAssets {
    pub favicon: Bytes,
}

#[derive(Clone)]
pub struct AppState {
    /// Shared with the upload pipeline; retrieval uses the reverse lookup.
    pub registry: Arc<SignatureRegistry>,
    pub storage: Arc<dyn Storage>,
    /// Only used by the readiness probe outside the pipeline.
    pub ledger: Arc<dyn UploadLedger>,
    pub upload: Arc<UploadPipeline>,
    pub assets: StaticAssets,
}
