use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

/// Health report. The service is `UP` while the cache is down, since
/// every request can still be served from the repository.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache: ComponentHealth,
    pub repository: ComponentHealth,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    pub fn up(backend: impl Into<String>) -> Self {
        Self {
            status: "UP".to_string(),
            backend: backend.into(),
            error: None,
        }
    }

    pub fn down(backend: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: "DOWN".to_string(),
            backend: backend.into(),
            error: Some(error.into()),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.cache().store().backend_name();
    let cache = match state.cache().ping().await {
        Ok(()) => ComponentHealth::up(backend),
        Err(e) => ComponentHealth::down(backend, e.to_string()),
    };

    Json(HealthResponse {
        status: "UP".to_string(),
        cache,
        repository: ComponentHealth::up(state.repository().name()),
    })
}
