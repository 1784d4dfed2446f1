use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::{get, on, MethodFilter, MethodRouter},
    Router,
};
use serde_json::Value;

use crate::media::MediaKind;
use crate::resource::{Operation, RecordId, Resource, Route, ROUTES};
use crate::server::{AppState, AuthenticatedCaller};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::health::health;
use super::media::{
    create_media, delete_media, get_media, list_media, media_log, replace_media, revert_media,
};
use super::metrics::prometheus_metrics;
use super::template::{
    create_template, delete_template, get_template, list_templates, render_template,
    replace_template, revert_template, template_log,
};

/// Prefix under which every resource is mounted
pub const API_PREFIX: &str = "/api/v1";

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Resources, built from the route table
        .nest(API_PREFIX, resource_routes())
}

fn resource_routes() -> Router<AppState> {
    let mut by_path: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();

    for route in ROUTES.iter() {
        let Some(handler) = handler_for(route) else {
            tracing::warn!(
                route = %route.name,
                method = %route.method,
                "No handler for route, skipped"
            );
            continue;
        };
        let path = route.path.as_str();
        let merged = match by_path.remove(path) {
            Some(existing) => existing.merge(handler),
            None => handler,
        };
        by_path.insert(path, merged);
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, methods)| router.route(path, methods))
}

fn handler_for(route: &Route) -> Option<MethodRouter<AppState>> {
    let filter = MethodFilter::try_from(route.method.clone()).ok()?;

    match route.resource {
        Resource::Templates => Some(template_handler(filter, route.operation)),
        media => media_handler(filter, MediaKind::from_resource(media)?, route.operation),
    }
}

fn template_handler(filter: MethodFilter, operation: Operation) -> MethodRouter<AppState> {
    match operation {
        Operation::List => on(filter, list_templates),
        Operation::Create => on(filter, create_template),
        Operation::Get => on(filter, get_template),
        Operation::Replace => on(filter, replace_template),
        Operation::Delete => on(filter, delete_template),
        Operation::Log => on(filter, template_log),
        Operation::Revert => on(filter, revert_template),
        Operation::Render => on(filter, render_template),
    }
}

type Params = ApiQuery<Vec<(String, String)>>;

fn media_handler(
    filter: MethodFilter,
    kind: MediaKind,
    operation: Operation,
) -> Option<MethodRouter<AppState>> {
    let handler = match operation {
        Operation::List => on(filter, move |state: State<AppState>, params: Params| {
            list_media(kind, state, params)
        }),
        Operation::Create => on(
            filter,
            move |state: State<AppState>,
                  caller: AuthenticatedCaller,
                  payload: ApiJson<Value>| create_media(kind, state, caller, payload),
        ),
        Operation::Get => on(filter, move |state: State<AppState>, id: ApiPath<RecordId>| {
            get_media(kind, state, id)
        }),
        Operation::Replace => on(
            filter,
            move |state: State<AppState>,
                  caller: AuthenticatedCaller,
                  id: ApiPath<RecordId>,
                  payload: ApiJson<Value>| replace_media(kind, state, caller, id, payload),
        ),
        Operation::Delete => on(
            filter,
            move |state: State<AppState>, caller: AuthenticatedCaller, id: ApiPath<RecordId>| {
                delete_media(kind, state, caller, id)
            },
        ),
        Operation::Log => on(filter, move |state: State<AppState>, id: ApiPath<RecordId>| {
            media_log(kind, state, id)
        }),
        Operation::Revert => on(
            filter,
            move |state: State<AppState>,
                  caller: AuthenticatedCaller,
                  path: ApiPath<(RecordId, u32)>| revert_media(kind, state, caller, path),
        ),
        Operation::Render => return None,
    };
    Some(handler)
}
