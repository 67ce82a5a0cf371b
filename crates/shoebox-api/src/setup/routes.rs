//! Route configuration and setup

use crate::handlers;
use crate::middleware::{rate_limit_middleware, request_id_middleware, RetrievalRateLimiter};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Build the full router.
///
/// `retrieval_limiter` wraps `GET /{name}` only; uploads, the favicon and the
/// health probes are never limited.
pub fn build_router(
    state: Arc<AppState>,
    retrieval_limiter: Option<Arc<RetrievalRateLimiter>>,
) -> Router {
    let mut file_routes = Router::new().route("/{name}", get(handlers::files::get_file));
    if let Some(limiter) = retrieval_limiter {
        file_routes = file_routes.route_layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    Router::new()
        .route("/", post(handlers::upload::upload_file))
        .route("/favicon.ico", get(handlers::favicon::favicon))
        .route("/health/live", get(handlers::health::liveness_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .merge(file_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}
