//! Template resource endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::error::{AppError, Result};
use crate::metrics::{MutationMetrics, RenderMetrics};
use crate::resource::{resolve, ListFilter, Operation, Resource};
use crate::server::{AppState, AuthenticatedCaller};
use crate::template::{
    Profile, RenderOutcome, RenderRequest, TemplateContent, TemplateId, TEMPLATE_FILTERS,
};

/// GET /api/v1/templates - List templates
///
/// Supports exact and partial search plus `order[field]=asc|desc`.
#[tracing::instrument(name = "http.list_templates", skip(state, params))]
pub async fn list_templates(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<Value>> {
    let filter = ListFilter::parse(&TEMPLATE_FILTERS, params)?;

    let records = state.repository.list().await?;
    let templates = filter.select(&records, Profile::Read.fields())?;

    Ok(Json(json!({
        "total": templates.len(),
        "templates": templates,
    })))
}

/// POST /api/v1/templates - Create a new template
#[tracing::instrument(
    name = "http.create_template",
    skip(state, caller, payload),
    fields(application = %caller.application_id())
)]
pub async fn create_template(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiJson(payload): ApiJson<Value>,
) -> Result<(StatusCode, Json<Value>)> {
    let content: TemplateContent = Profile::Write.accept(payload)?;

    let result = state.repository.create(content, caller.provenance()).await;
    MutationMetrics::record(Resource::Templates, Operation::Create, &result);
    let created = result?;

    tracing::info!(template_id = created.id, "Template created");
    Ok((StatusCode::CREATED, Json(Profile::Read.view(&created)?)))
}

/// GET /api/v1/templates/{id} - Get a specific template
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TemplateId>,
) -> Result<Json<Value>> {
    let template = state.repository.load_by_id(id).await?;
    Ok(Json(Profile::Read.view(&template)?))
}

/// PUT /api/v1/templates/{id} - Replace a template's content
#[tracing::instrument(
    name = "http.replace_template",
    skip(state, caller, payload),
    fields(application = %caller.application_id())
)]
pub async fn replace_template(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiPath(id): ApiPath<TemplateId>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Json<Value>> {
    let content: TemplateContent = Profile::Write.accept(payload)?;

    let result = state.repository.replace(id, content).await;
    MutationMetrics::record(Resource::Templates, Operation::Replace, &result);
    let replaced = result?;

    tracing::info!(
        template_id = id,
        version = replaced.current_version(),
        "Template replaced"
    );
    Ok(Json(Profile::Read.view(&replaced)?))
}

/// DELETE /api/v1/templates/{id} - Delete a template
#[tracing::instrument(
    name = "http.delete_template",
    skip(state, caller),
    fields(application = %caller.application_id())
)]
pub async fn delete_template(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiPath(id): ApiPath<TemplateId>,
) -> Result<StatusCode> {
    let result = state.repository.delete(id).await;
    MutationMetrics::record(Resource::Templates, Operation::Delete, &result);
    result?;

    tracing::info!(template_id = id, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates/{id}/log - Version history
#[tracing::instrument(name = "http.template_log", skip(state))]
pub async fn template_log(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TemplateId>,
) -> Result<Json<Value>> {
    let template = state.repository.load_by_id(id).await?;
    Ok(Json(Profile::Log.view(&template)?))
}

/// POST /api/v1/templates/{id}/revert/{version} - Restore an earlier version
#[tracing::instrument(
    name = "http.revert_template",
    skip(state, caller),
    fields(application = %caller.application_id())
)]
pub async fn revert_template(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiPath((id, version)): ApiPath<(TemplateId, u32)>,
) -> Result<(StatusCode, Json<Value>)> {
    let result = state.repository.revert(id, version).await;
    MutationMetrics::record(Resource::Templates, Operation::Revert, &result);
    let reverted = result?;

    tracing::info!(template_id = id, version, "Template reverted");
    Ok((StatusCode::ACCEPTED, Json(Profile::Read.view(&reverted)?)))
}

/// GET /api/v1/templates/{id}/render - Render title and body
///
/// Query parameters are the caller's variables.
#[tracing::instrument(name = "http.render_template", skip(state, uri, variables))]
pub async fn render_template(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    ApiPath(id): ApiPath<TemplateId>,
    ApiQuery(variables): ApiQuery<BTreeMap<String, String>>,
) -> Result<Response> {
    let route = resolve(&method, uri.path());
    let raw = Value::Object(
        variables
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    );

    let outcome = state
        .renderer
        .handle(RenderRequest {
            template_id: id,
            method: &method,
            route,
            variables: Some(&raw),
        })
        .await;

    match outcome {
        Ok(RenderOutcome::Response(response)) => {
            RenderMetrics::record_rendered();
            Ok((
                response.status,
                [(header::CONTENT_TYPE, response.content_type)],
                response.body,
            )
                .into_response())
        }
        Ok(RenderOutcome::PassThrough) => {
            // Only reachable when the route table and the router disagree
            RenderMetrics::record_pass_through();
            tracing::error!(
                template_id = id,
                method = %method,
                path = uri.path(),
                "Render route not recognized by the route table"
            );
            Err(AppError::Internal(
                "render route does not match the route table".to_string(),
            ))
        }
        Err(e) => {
            RenderMetrics::record_failure(&e);
            Err(e.into())
        }
    }
}
