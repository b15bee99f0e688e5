use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use estate_core::EstateError;
use serde::Serialize;

use crate::repository::RepositoryError;

/// Errors surfaced to HTTP clients.
///
/// Cache failures never show up here; they only add warning headers.
#[derive(Debug)]
pub enum AppError {
    /// Recurso no encontrado
    NotFound(String),

    /// Falta el usuario que actua
    Unauthorized(String),

    /// El usuario no es el dueno del recurso
    Forbidden(String),

    Conflict(String),

    /// Parametros invalidos
    BadRequest(String),

    /// The data source could not be reached.
    Unavailable(String),

    /// Error interno
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        let message = err.to_string();
        match err {
            RepositoryError::NotFound(_) => AppError::NotFound(message),
            RepositoryError::Forbidden { .. } => AppError::Forbidden(message),
            RepositoryError::Conflict(_) => AppError::Conflict(message),
            RepositoryError::Invalid(_) => AppError::BadRequest(message),
            RepositoryError::Unavailable(_) => AppError::Unavailable(message),
        }
    }
}

impl From<EstateError> for AppError {
    fn from(err: EstateError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable", msg)
            },
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                msg,
            ),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), %message, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::{PropertyId, UserId};

    #[test]
    fn test_repository_errors_map_to_statuses() {
        let cases = [
            (RepositoryError::NotFound(PropertyId::new("PROP0001")), StatusCode::NOT_FOUND),
            (
                RepositoryError::Forbidden {
                    id: PropertyId::new("PROP0001"),
                    user: UserId::new("mallory"),
                },
                StatusCode::FORBIDDEN,
            ),
            (RepositoryError::Conflict(PropertyId::new("PROP0001")), StatusCode::CONFLICT),
            (
                RepositoryError::Invalid(EstateError::validation_error("price", "negative")),
                StatusCode::BAD_REQUEST,
            ),
            (
                RepositoryError::Unavailable("db down".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
