//! Cache administration endpoints.

use axum::{extract::State, response::Response};
use tracing::instrument;

use crate::handlers::response::{InvalidateResponse, outcome_json};
use crate::state::AppState;

/// DELETE /cache
/// Vacia el backend completo.
#[instrument(skip_all)]
pub async fn flush_cache(State(state): State<AppState>) -> Response {
    let outcome = state.cache().flush_all().await;

    let message = if outcome.is_degraded() {
        "Cache flush could not be completed".to_string()
    } else {
        format!("Flushed {} cache", state.cache().store().backend_name())
    };

    outcome_json(
        &outcome,
        InvalidateResponse {
            invalidated: 0,
            patterns: vec!["*".to_string()],
            message,
        },
    )
}

/// DELETE /cache/properties
/// Invalida todas las categorias de listados.
#[instrument(skip_all)]
pub async fn invalidate_properties(State(state): State<AppState>) -> Response {
    let outcome = state.cache().invalidate_property_caches().await;
    let result = outcome.value().clone();

    outcome_json(
        &outcome,
        InvalidateResponse {
            invalidated: result.count,
            message: format!("Invalidated {} property cache entries", result.count),
            patterns: result.patterns,
        },
    )
}
