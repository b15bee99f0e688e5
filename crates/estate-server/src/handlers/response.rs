//! Response bodies and cache headers.

use axum::{
    Json,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use estate_cache::{CacheError, CacheOutcome, ReadOutcome, WriteOutcome};
use estate_core::PropertyId;
use serde::Serialize;

/// Cache status of a read (`HIT`, `MISS`, `BYPASS`).
pub static CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// Number of cache operations that degraded while serving the request.
pub static CACHE_WARNING_HEADER: HeaderName = HeaderName::from_static("x-cache-warning");

/// Number of cache entries purged by a write.
pub static CACHE_INVALIDATED_HEADER: HeaderName = HeaderName::from_static("x-cache-invalidated");

/// Body returned by DELETE /properties/{id}.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: PropertyId,
}

/// Response para operaciones de invalidacion.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Numero de entries invalidadas.
    pub invalidated: usize,
    pub patterns: Vec<String>,
    pub message: String,
}

fn insert_warning_count(headers: &mut HeaderMap, warnings: &[CacheError]) {
    if !warnings.is_empty() {
        headers.insert(CACHE_WARNING_HEADER.clone(), HeaderValue::from(warnings.len()));
    }
}

/// JSON response for a read-through result.
pub fn cached_json<T: Serialize>(read: ReadOutcome<T>) -> Response {
    let mut response = Json(read.value).into_response();
    let headers = response.headers_mut();
    headers.insert(
        CACHE_STATUS_HEADER.clone(),
        HeaderValue::from_static(read.status.as_str()),
    );
    insert_warning_count(headers, &read.warnings);
    response
}

/// JSON response for a committed write.
pub fn written_json<R, B>(status: StatusCode, written: WriteOutcome<R>, body: B) -> Response
where
    B: Serialize,
{
    let mut response = (status, Json(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        CACHE_INVALIDATED_HEADER.clone(),
        HeaderValue::from(written.invalidation.count),
    );
    insert_warning_count(headers, &written.warnings);
    response
}

/// JSON response for a direct cache administration call.
pub fn outcome_json<T, B>(outcome: &CacheOutcome<T>, body: B) -> Response
where
    B: Serialize,
{
    let mut response = Json(body).into_response();
    insert_warning_count(response.headers_mut(), outcome.warnings());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_cache::CacheStatus;

    #[test]
    fn test_cached_json_sets_status_header() {
        let read = ReadOutcome {
            value: vec![1, 2, 3],
            status: CacheStatus::Hit,
            warnings: Vec::new(),
        };

        let response = cached_json(read);
        assert_eq!(response.headers()["x-cache"], "HIT");
        assert!(response.headers().get("x-cache-warning").is_none());
    }

    #[test]
    fn test_warning_count_header() {
        let read = ReadOutcome {
            value: "x",
            status: CacheStatus::Bypass,
            warnings: vec![
                CacheError::unavailable("redis", "connection refused"),
                CacheError::unavailable("redis", "backing off"),
            ],
        };

        let response = cached_json(read);
        assert_eq!(response.headers()["x-cache"], "BYPASS");
        assert_eq!(response.headers()["x-cache-warning"], "2");
    }
}
