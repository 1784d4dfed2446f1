//! Field visibility and collection filters for media items

use crate::resource::FilterFields;

/// Fields a media view exposes
pub const MEDIA_READ_FIELDS: &[&str] = &[
    "id",
    "externalIdentifier",
    "sourceOrganization",
    "name",
    "originalName",
    "size",
    "extension",
    "mimeType",
    "url",
    "base64",
    "contactPerson",
    "createdAt",
    "updatedAt",
    "owner",
];

/// Fields a media payload may set
pub const MEDIA_WRITE_FIELDS: &[&str] = &[
    "externalIdentifier",
    "name",
    "originalName",
    "size",
    "extension",
    "mimeType",
    "url",
    "base64",
    "contactPerson",
];

pub const MEDIA_LOG_FIELDS: &[&str] = &["changeLog"];

/// Search and ordering accepted on every media collection
pub const MEDIA_FILTERS: FilterFields = FilterFields {
    exact: &["sourceOrganization", "extension", "mimeType"],
    partial: &["name", "originalName"],
    order: &["name", "originalName", "size", "createdAt", "updatedAt"],
};
