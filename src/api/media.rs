//! Media endpoints, shared by documents, images and films.
//!
//! Each handler takes the kind first; the router binds it per collection.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::error::Result;
use crate::media::{
    MediaContent, MediaKind, MEDIA_FILTERS, MEDIA_LOG_FIELDS, MEDIA_READ_FIELDS,
    MEDIA_WRITE_FIELDS,
};
use crate::metrics::MutationMetrics;
use crate::resource::{accept, view, ListFilter, Operation, RecordId};
use crate::server::{AppState, AuthenticatedCaller};

/// GET /api/v1/{collection}
#[tracing::instrument(name = "http.list_media", skip(state, params))]
pub async fn list_media(
    kind: MediaKind,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<Value>> {
    let filter = ListFilter::parse(&MEDIA_FILTERS, params)?;
    let items = state.media.list(kind).await?;
    let selected = filter.select(&items, MEDIA_READ_FIELDS)?;

    Ok(Json(json!({
        "total": selected.len(),
        kind.collection(): selected,
    })))
}

/// POST /api/v1/{collection}
#[tracing::instrument(
    name = "http.create_media",
    skip(state, caller, payload),
    fields(application = %caller.application_id())
)]
pub async fn create_media(
    kind: MediaKind,
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiJson(payload): ApiJson<Value>,
) -> Result<(StatusCode, Json<Value>)> {
    let content: MediaContent = accept(MEDIA_WRITE_FIELDS, payload)?;

    let result = state.media.create(kind, content, caller.provenance()).await;
    MutationMetrics::record(kind.resource(), Operation::Create, &result);
    let created = result?;

    tracing::info!(resource = kind.collection(), item_id = created.id, "Media item created");
    Ok((StatusCode::CREATED, Json(view(MEDIA_READ_FIELDS, &created)?)))
}

/// GET /api/v1/{collection}/{id}
#[tracing::instrument(name = "http.get_media", skip(state))]
pub async fn get_media(
    kind: MediaKind,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Value>> {
    let item = state.media.load_by_id(kind, id).await?;
    Ok(Json(view(MEDIA_READ_FIELDS, &item)?))
}

/// PUT /api/v1/{collection}/{id}
#[tracing::instrument(
    name = "http.replace_media",
    skip(state, caller, payload),
    fields(application = %caller.application_id())
)]
pub async fn replace_media(
    kind: MediaKind,
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiPath(id): ApiPath<RecordId>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Json<Value>> {
    let content: MediaContent = accept(MEDIA_WRITE_FIELDS, payload)?;

    let result = state.media.replace(kind, id, content).await;
    MutationMetrics::record(kind.resource(), Operation::Replace, &result);
    let replaced = result?;

    tracing::info!(
        resource = kind.collection(),
        item_id = id,
        version = replaced.current_version(),
        "Media item replaced"
    );
    Ok(Json(view(MEDIA_READ_FIELDS, &replaced)?))
}

/// DELETE /api/v1/{collection}/{id}
#[tracing::instrument(
    name = "http.delete_media",
    skip(state, caller),
    fields(application = %caller.application_id())
)]
pub async fn delete_media(
    kind: MediaKind,
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiPath(id): ApiPath<RecordId>,
) -> Result<StatusCode> {
    let result = state.media.delete(kind, id).await;
    MutationMetrics::record(kind.resource(), Operation::Delete, &result);
    result?;

    tracing::info!(resource = kind.collection(), item_id = id, "Media item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/{collection}/{id}/log
#[tracing::instrument(name = "http.media_log", skip(state))]
pub async fn media_log(
    kind: MediaKind,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Value>> {
    let item = state.media.load_by_id(kind, id).await?;
    Ok(Json(view(MEDIA_LOG_FIELDS, &item)?))
}

/// POST /api/v1/{collection}/{id}/revert/{version}
#[tracing::instrument(
    name = "http.revert_media",
    skip(state, caller),
    fields(application = %caller.application_id())
)]
pub async fn revert_media(
    kind: MediaKind,
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiPath((id, version)): ApiPath<(RecordId, u32)>,
) -> Result<(StatusCode, Json<Value>)> {
    let result = state.media.revert(kind, id, version).await;
    MutationMetrics::record(kind.resource(), Operation::Revert, &result);
    let reverted = result?;

    tracing::info!(resource = kind.collection(), item_id = id, version, "Media item reverted");
    Ok((StatusCode::ACCEPTED, Json(view(MEDIA_READ_FIELDS, &reverted)?)))
}
