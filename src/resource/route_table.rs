//! Explicit route table for every exposed resource

use axum::http::Method;
use lazy_static::lazy_static;

/// A resource collection exposed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Templates,
    Documents,
    Images,
    Films,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Templates,
        Resource::Documents,
        Resource::Images,
        Resource::Films,
    ];

    /// Collection name used in paths and metric labels
    pub fn name(self) -> &'static str {
        match self {
            Resource::Templates => "templates",
            Resource::Documents => "documents",
            Resource::Images => "images",
            Resource::Films => "films",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Resource::Templates => "template",
            Resource::Documents => "document",
            Resource::Images => "image",
            Resource::Films => "film",
        }
    }

    /// Operations this resource exposes; only templates render
    pub fn operations(self) -> &'static [Operation] {
        const RECORD: [Operation; 7] = [
            Operation::List,
            Operation::Create,
            Operation::Get,
            Operation::Replace,
            Operation::Delete,
            Operation::Log,
            Operation::Revert,
        ];
        const TEMPLATE: [Operation; 8] = [
            Operation::List,
            Operation::Create,
            Operation::Get,
            Operation::Replace,
            Operation::Delete,
            Operation::Log,
            Operation::Revert,
            Operation::Render,
        ];

        match self {
            Resource::Templates => &TEMPLATE,
            Resource::Documents | Resource::Images | Resource::Films => &RECORD,
        }
    }
}

/// An operation on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Get,
    Replace,
    Delete,
    Log,
    Revert,
    Render,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Get => "get",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
            Operation::Log => "log",
            Operation::Revert => "revert",
            Operation::Render => "render",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Operation::List | Operation::Get | Operation::Log | Operation::Render => Method::GET,
            Operation::Create | Operation::Revert => Method::POST,
            Operation::Replace => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    fn path_suffix(self) -> &'static str {
        match self {
            Operation::List | Operation::Create => "",
            Operation::Get | Operation::Replace | Operation::Delete => "/{id}",
            Operation::Log => "/{id}/log",
            Operation::Revert => "/{id}/revert/{version}",
            Operation::Render => "/{id}/render",
        }
    }

    fn scope(self) -> &'static str {
        match self {
            Operation::List | Operation::Create => "collection",
            _ => "item",
        }
    }
}

/// One row of the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub resource: Resource,
    pub operation: Operation,
    pub method: Method,
    /// Path pattern relative to the API prefix, axum syntax
    pub path: String,
    /// Stable identifier, e.g. `templates_render_item`
    pub name: String,
}

impl Route {
    fn new(resource: Resource, operation: Operation) -> Self {
        Self {
            resource,
            operation,
            method: operation.method(),
            path: format!("/{}{}", resource.name(), operation.path_suffix()),
            name: format!(
                "{}_{}_{}",
                resource.name(),
                operation.name(),
                operation.scope()
            ),
        }
    }

    /// Table entry for an operation on a resource
    pub fn find(resource: Resource, operation: Operation) -> Option<&'static Route> {
        ROUTES
            .iter()
            .find(|route| route.resource == resource && route.operation == operation)
    }
}

lazy_static! {
    /// Method and path of every operation on every resource
    pub static ref ROUTES: Vec<Route> = Resource::ALL
        .iter()
        .flat_map(|&resource| {
            resource
                .operations()
                .iter()
                .map(move |&operation| Route::new(resource, operation))
        })
        .collect();
}

/// Resolve a method and concrete path (relative to the API prefix)
pub fn resolve(method: &Method, path: &str) -> Option<&'static Route> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    ROUTES
        .iter()
        .filter(|route| route.method == *method)
        .find(|route| {
            let pattern: Vec<&str> = route.path.trim_matches('/').split('/').collect();
            pattern.len() == segments.len()
                && pattern
                    .iter()
                    .zip(segments.iter())
                    .all(|(expected, actual)| {
                        if expected.starts_with('{') && expected.ends_with('}') {
                            !actual.is_empty()
                        } else {
                            expected == actual
                        }
                    })
        })
}
