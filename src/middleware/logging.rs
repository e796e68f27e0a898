//! Logging middleware
//!
//! Records HTTP request and response information

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

/// Response header carrying the generated request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Requests slower than this are logged at warn
const SLOW_REQUEST_SECS: u64 = 10;

/// Request logging middleware
///
/// Assigns a request id, runs the request inside a span carrying it, and
/// echoes it back in the `x-request-id` response header.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
    );

    let mut response = async move {
        info!(
            "Request started: {} {} - User-Agent: {}",
            method,
            uri,
            request
                .headers()
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
        );

        let response = next.run(request).await;
        log_completion(response.status(), start_time);

        if start_time.elapsed().as_secs() > SLOW_REQUEST_SECS {
            warn!(
                "Slow request detected: {} {} - Duration: {:.2}s",
                method,
                uri,
                start_time.elapsed().as_secs_f64()
            );
        }

        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn log_completion(status: StatusCode, start_time: Instant) {
    let millis = start_time.elapsed().as_secs_f64() * 1000.0;

    if status.is_server_error() {
        error!("Server error: {} - Duration: {:.2}ms", status, millis);
    } else if status.is_client_error() {
        warn!("Client error: {} - Duration: {:.2}ms", status, millis);
    } else {
        info!("Request completed: {} - Duration: {:.2}ms", status, millis);
    }
}
