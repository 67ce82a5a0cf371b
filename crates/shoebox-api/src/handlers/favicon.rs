use crate::state::AppState;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

/// `GET /favicon.ico`
pub async fn favicon(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/x-icon"),
            (header::CACHE_CONTROL, "public, max-age=604800"),
        ],
        state.assets.favicon.clone(),
    )
}
