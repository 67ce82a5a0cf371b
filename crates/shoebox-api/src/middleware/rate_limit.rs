use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct WindowState {
    window_start: Instant,
    count: u32,
}

/// Single shared fixed-window counter.
///
/// Every call counts against the same window, so this throttles aggregate
/// traffic rather than individual clients. Once more than `max_requests` calls
/// land in one window, callers get a clone of `fallback` until the window
/// rolls over.
pub struct FixedWindowLimiter<T: Clone> {
    window: Duration,
    max_requests: u32,
    fallback: T,
    state: Mutex<WindowState>,
}

impl<T: Clone> FixedWindowLimiter<T> {
    pub fn new(window: Duration, max_requests: u32, fallback: T) -> Self {
        Self {
            window,
            max_requests,
            fallback,
            state: Mutex::new(WindowState {
                window_start: Instant::now(),
                count: 0,
            }),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn fallback(&self) -> &T {
        &self.fallback
    }

    /// Count one call against the current window.
    ///
    /// Returns the remaining allowance when the call may proceed, or the time
    /// until the window resets when it is over the limit.
    pub async fn try_acquire(&self) -> Result<u32, Duration> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        if now.duration_since(state.window_start) >= self.window {
            state.count = 0;
            state.window_start = now;
        }

        state.count = state.count.saturating_add(1);

        if state.count > self.max_requests {
            Err(self.window.saturating_sub(now.duration_since(state.window_start)))
        } else {
            Ok(self.max_requests - state.count)
        }
    }

    /// Run `f` if the window allows it, otherwise return the fallback without calling `f`.
    pub async fn call<F, Fut>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.try_acquire().await {
            Ok(_) => f().await,
            Err(_) => self.fallback.clone(),
        }
    }
}

/// Placeholder served instead of the requested file while retrieval is limited.
#[derive(Clone, Debug)]
pub struct FallbackPayload {
    pub body: Bytes,
    pub content_type: HeaderValue,
}

impl FallbackPayload {
    fn into_response(self, limit: u32, reset_in: Duration) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = StatusCode::OK;

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, self.content_type);
        // The placeholder must not be cached under the requested file's URL.
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        if let Ok(header_value) = HeaderValue::from_str(&limit.to_string()) {
            headers.insert("X-RateLimit-Limit", header_value);
        }
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
        if let Ok(header_value) = HeaderValue::from_str(&reset_in.as_secs().max(1).to_string()) {
            headers.insert(header::RETRY_AFTER, header_value);
        }

        response
    }
}

pub type RetrievalRateLimiter = FixedWindowLimiter<FallbackPayload>;

/// Rate limiting middleware for the retrieval route
///
/// # Headers
/// - `X-RateLimit-Limit`: requests allowed per window
/// - `X-RateLimit-Remaining`: requests left in the current window
///
/// When the window is exhausted the request never reaches the handler and the
/// fallback payload is returned with `200 OK`.
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<RetrievalRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let limit = rate_limiter.max_requests();

    match rate_limiter.try_acquire().await {
        Ok(remaining) => {
            let mut response = next.run(request).await;

            if let Ok(header_value) = HeaderValue::from_str(&limit.to_string()) {
                response
                    .headers_mut()
                    .insert("X-RateLimit-Limit", header_value);
            }
            if let Ok(header_value) = HeaderValue::from_str(&remaining.to_string()) {
                response
                    .headers_mut()
                    .insert("X-RateLimit-Remaining", header_value);
            }

            response
        }
        Err(reset_in) => {
            tracing::warn!(
                path = %request.uri().path(),
                limit,
                reset_in_secs = reset_in.as_secs(),
                "Retrieval rate limit exceeded, serving fallback"
            );
            rate_limiter.fallback().clone().into_response(limit, reset_in)
        }
    }
}
