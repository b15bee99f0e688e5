//! Property listing endpoints.
//!
//! Reads go through [`CacheFacade::read_through`](estate_cache::CacheFacade::read_through)
//! and writes through `write_through`, so the repository stays the source
//! of truth and the cache only ever holds derived copies.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use estate_cache::{CacheCategory, Committed, KeySource, WriteOperation};
use estate_core::{PropertyDraft, PropertyPatch, PropertyRecord};
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::{ActingUser, PropertyPath, SearchQuery, UserPath};
use crate::handlers::response::{DeleteResponse, cached_json, written_json};
use crate::repository::RepositoryError;
use crate::state::AppState;

fn committed(record: PropertyRecord) -> Committed<PropertyRecord> {
    let id = record.id.clone();
    let owner = record.owner_id.clone();
    Committed::new(record).with_property(id).with_owner(owner)
}

/// GET /properties
#[instrument(skip_all)]
pub async fn list_properties(State(state): State<AppState>) -> Result<Response, AppError> {
    let repo = state.repository();
    let read = state
        .cache()
        .read_through(CacheCategory::AllProperties, KeySource::Singleton, || repo.list())
        .await?;

    Ok(cached_json(read))
}

/// GET /properties/search
#[instrument(skip_all, fields(sort_by = %filters.sort_by().name()))]
pub async fn search_properties(
    State(state): State<AppState>,
    SearchQuery(filters): SearchQuery,
) -> Result<Response, AppError> {
    let repo = state.repository();
    let read = state
        .cache()
        .read_through(CacheCategory::SearchResults, KeySource::Filters(&filters), || {
            repo.search(&filters)
        })
        .await?;

    Ok(cached_json(read))
}

/// GET /properties/filter-options
#[instrument(skip_all)]
pub async fn filter_options(State(state): State<AppState>) -> Result<Response, AppError> {
    let repo = state.repository();
    let read = state
        .cache()
        .read_through(CacheCategory::FilterOptions, KeySource::Singleton, || {
            repo.filter_options()
        })
        .await?;

    Ok(cached_json(read))
}

/// GET /properties/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn get_property(
    State(state): State<AppState>,
    Path(path): Path<PropertyPath>,
) -> Result<Response, AppError> {
    let id = path.property_id()?;
    let repo = state.repository();
    let read = state
        .cache()
        .read_through(
            CacheCategory::PropertyDetail,
            KeySource::Identifier(id.as_str()),
            || repo.get(&id),
        )
        .await?;

    Ok(cached_json(read))
}

/// GET /users/{user_id}/properties
///
/// An owner without listings gets an empty array.
#[instrument(skip_all, fields(user = %path.user_id))]
pub async fn user_properties(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
) -> Result<Response, AppError> {
    let owner = path.owner_id()?;
    let repo = state.repository();
    let read = state
        .cache()
        .read_through(
            CacheCategory::UserProperties,
            KeySource::Identifier(owner.as_str()),
            || repo.list_by_owner(&owner),
        )
        .await?;

    Ok(cached_json(read))
}

/// POST /properties
#[instrument(skip_all, fields(user = %user))]
pub async fn create_property(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Json(draft): Json<PropertyDraft>,
) -> Result<Response, AppError> {
    let repo = state.repository();
    let written = state
        .cache()
        .write_through(WriteOperation::create().with_owner(user.clone()), || async {
            let record = repo.create(&user, draft).await?;
            Ok::<_, RepositoryError>(committed(record))
        })
        .await?;

    let body = written.value.clone();
    Ok(written_json(StatusCode::CREATED, written, body))
}

/// POST /properties/import
///
/// Each draft is inserted independently; the report lists the ones that
/// were rejected.
#[instrument(skip_all, fields(user = %user, count = drafts.len()))]
pub async fn import_properties(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Json(drafts): Json<Vec<PropertyDraft>>,
) -> Result<Response, AppError> {
    if drafts.is_empty() {
        return Err(AppError::BadRequest("import contains no properties".to_string()));
    }

    let repo = state.repository();
    let written = state
        .cache()
        .write_through(WriteOperation::bulk_import().with_owner(user.clone()), || async {
            let report = repo.bulk_create(&user, drafts).await?;
            Ok::<_, RepositoryError>(Committed::new(report))
        })
        .await?;

    tracing::info!(
        inserted = written.value.successful_inserts,
        failed = written.value.failed_inserts,
        "Import finished"
    );

    let status = if written.value.successful_inserts > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let body = written.value.clone();
    Ok(written_json(status, written, body))
}

/// PUT /properties/{id}
#[instrument(skip_all, fields(id = %path.id, user = %user))]
pub async fn update_property(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(path): Path<PropertyPath>,
    Json(patch): Json<PropertyPatch>,
) -> Result<Response, AppError> {
    let id = path.property_id()?;
    let repo = state.repository();
    let written = state
        .cache()
        .write_through(WriteOperation::update(id.clone()), || async {
            let record = repo.update(&user, &id, patch).await?;
            Ok::<_, RepositoryError>(committed(record))
        })
        .await?;

    let body = written.value.clone();
    Ok(written_json(StatusCode::OK, written, body))
}

/// DELETE /properties/{id}
#[instrument(skip_all, fields(id = %path.id, user = %user))]
pub async fn delete_property(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(path): Path<PropertyPath>,
) -> Result<Response, AppError> {
    let id = path.property_id()?;
    let repo = state.repository();
    let written = state
        .cache()
        .write_through(WriteOperation::delete(id.clone()), || async {
            let record = repo.delete(&user, &id).await?;
            Ok::<_, RepositoryError>(committed(record))
        })
        .await?;

    let body = DeleteResponse {
        message: "Property deleted successfully".to_string(),
        id: written.value.id.clone(),
    };
    Ok(written_json(StatusCode::OK, written, body))
}
