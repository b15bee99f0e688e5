use axum::{
    extract::FromRequestParts,
    http::{HeaderName, request::Parts},
};
use estate_core::UserId;

use crate::error::AppError;

/// Header carrying the acting user.
pub static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// The user performing a write, taken from `x-user-id`.
///
/// Rejects with 401 when the header is missing or blank.
#[derive(Debug, Clone)]
pub struct ActingUser(pub UserId);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(&USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing x-user-id header".to_string()))?;

        UserId::parse(raw)
            .map(ActingUser)
            .map_err(|e| AppError::Unauthorized(e.to_string()))
    }
}
