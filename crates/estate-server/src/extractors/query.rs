use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use estate_core::FilterSet;

use crate::error::AppError;

/// Search parameters parsed into a normalized [`FilterSet`].
///
/// Unknown keys are dropped so they cannot fragment the search cache.
#[derive(Debug, Clone)]
pub struct SearchQuery(pub FilterSet);

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let (filters, ignored) = FilterSet::parse_params(params);
        if !ignored.is_empty() {
            tracing::debug!(?ignored, "Ignoring unknown search parameters");
        }

        Ok(SearchQuery(filters))
    }
}
