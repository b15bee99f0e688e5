//! HTTP metrics middleware.

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use std::time::Instant;

use crate::handlers::response::CACHE_STATUS_HEADER;

/// Middleware que registra metricas HTTP para cada request.
///
/// Paths are recorded by route template (`/properties/{id}`) so ids do not
/// blow up label cardinality.
pub async fn http_metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    let cache = response
        .headers()
        .get(&CACHE_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("NONE")
        .to_string();
    let duration = start.elapsed();

    counter!(
        "estate_http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status,
        "cache" => cache
    )
    .increment(1);

    histogram!(
        "estate_http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration.as_secs_f64());

    response
}

/// Registra las metricas HTTP
pub fn register_http_metrics() {
    metrics::describe_counter!(
        "estate_http_requests_total",
        "Total number of HTTP requests"
    );
    metrics::describe_histogram!(
        "estate_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
}
