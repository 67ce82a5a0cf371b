//! `POST /`

use crate::error::UploadRejection;
use crate::state::AppState;
use axum::extract::{Request, State};
use std::sync::Arc;

/// Accept a ShareX upload and answer with the public URL as plain text.
///
/// Any rejection is a bare status code; the reason only goes to the log.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<String, UploadRejection> {
    let (parts, body) = request.into_parts();
    let accepted = state.upload.run(&parts.headers, body).await?;
    Ok(accepted.url)
}
