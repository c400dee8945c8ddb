//! Request logging middleware.
//!
//! One line per request with method, path, status and latency. Header values
//! are never logged, so bearer tokens stay out of the output.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn, Instrument};

/// Liveness probes, served but not logged.
const QUIET_PATHS: [&str; 2] = ["/health", "/health/"];

pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if QUIET_PATHS.contains(&path.as_str()) {
        return next.run(request).await;
    }

    let span = tracing::info_span!("http_request", method = %method, path = %path);
    let start = Instant::now();

    let response = next.run(request).instrument(span).await;

    let latency_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), latency_ms, "Request failed (5xx)");
    } else if status.as_u16() == 401 || status.as_u16() == 403 {
        warn!(%method, %path, status = status.as_u16(), latency_ms, "Request denied");
    } else {
        info!(%method, %path, status = status.as_u16(), latency_ms, "Request completed");
    }

    response
}
