//! `GET /{name}`: serve a previously uploaded file.

use crate::error::{storage_error, HttpAppError};
use crate::services::is_generated_name;
use crate::state::AppState;
use crate::utils::extract_client_ip;
use axum::{
    body::Body,
    extract::{ConnectInfo, Path, Request, State},
    http::{header, StatusCode},
    response::Response,
};
use futures::StreamExt;
use shoebox_core::AppError;
use std::net::SocketAddr;
use std::sync::Arc;

const CACHE_CONTROL: &str = "public, max-age=86400";

#[tracing::instrument(skip(state, request), fields(operation = "get_file"))]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    request: Request,
) -> Result<Response, HttpAppError> {
    // Anything that could not have been produced by the name generator is
    // answered without touching storage.
    if !is_generated_name(&name) {
        return Err(AppError::NotFound(name).into());
    }

    if !state.storage.exists(&name).await? {
        return Err(AppError::NotFound(name).into());
    }

    let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    let content_type = state
        .registry
        .extension_for(extension)
        .ok_or_else(|| AppError::UnknownExtension(extension.to_string()))?
        .to_string();

    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = extract_client_ip(request.headers(), socket_addr.as_ref());
    let age_secs = state.storage.age(&name).await.ok().map(|age| age.as_secs());
    tracing::info!(
        client_ip = %client_ip,
        path = %request.uri().path(),
        age_secs = ?age_secs,
        "Serving file"
    );

    let stream = state.storage.read_stream(&name).await.map_err(|e| {
        tracing::error!(error = %e, file_name = %name, "Failed to open file for streaming");
        storage_error(e)
    })?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
