//! Per-operation field visibility.
//!
//! Every view leaving the service and every payload entering it passes
//! through one of these profiles. Fields not listed in a profile are dropped.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::resource::{self, FilterFields};

use super::types::TemplateResult;

const READ_FIELDS: &[&str] = &[
    "id",
    "externalIdentifier",
    "sourceOrganization",
    "kind",
    "internalName",
    "externalTitle",
    "description",
    "body",
    "createdAt",
    "updatedAt",
    "contactPerson",
    "owner",
    "slug",
    "metaDescription",
    "metaKeywords",
    "metaRobots",
    "metaRevisitAfter",
    "metaAuthor",
    "metaCopyright",
    "metaContact",
    "metaOriginalSource",
    "metaCanonical",
];

const WRITE_FIELDS: &[&str] = &[
    "externalIdentifier",
    "kind",
    "internalName",
    "externalTitle",
    "description",
    "body",
    "contactPerson",
    "slug",
    "metaDescription",
    "metaKeywords",
    "metaRobots",
    "metaRevisitAfter",
    "metaAuthor",
    "metaCopyright",
    "metaContact",
    "metaOriginalSource",
    "metaCanonical",
];

const RENDER_FIELDS: &[&str] = &["id", "externalTitle", "body", "variables"];

const LOG_FIELDS: &[&str] = &["changeLog"];

/// Search and ordering accepted on the template collection
pub const TEMPLATE_FILTERS: FilterFields = FilterFields {
    exact: &["sourceOrganization", "kind", "slug"],
    partial: &["internalName", "externalTitle", "description", "body"],
    order: &[
        "sourceOrganization",
        "kind",
        "slug",
        "internalName",
        "externalTitle",
        "createdAt",
        "updatedAt",
    ],
};

/// Visibility profile of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Read,
    Write,
    Render,
    Log,
}

impl Profile {
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Profile::Read => READ_FIELDS,
            Profile::Write => WRITE_FIELDS,
            Profile::Render => RENDER_FIELDS,
            Profile::Log => LOG_FIELDS,
        }
    }

    /// Keep only the fields of this profile in a JSON object
    pub fn project(self, value: Value) -> Value {
        resource::project(self.fields(), value)
    }

    /// Serialize an entity and project it through this profile
    pub fn view<T: Serialize>(self, entity: &T) -> TemplateResult<Value> {
        Ok(self.project(serde_json::to_value(entity)?))
    }

    /// Project an incoming payload and deserialize what remains
    pub fn accept<T: DeserializeOwned>(self, payload: Value) -> TemplateResult<T> {
        Ok(resource::accept(self.fields(), payload)?)
    }
}
