//! Record shape shared by every stored resource

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::route_table::Resource;

/// Repository-assigned record identifier
pub type RecordId = u64;

/// A single field-level constraint violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub(crate) fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by record storage and projection
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} not found: {id}", .resource.singular())]
    NotFound { resource: Resource, id: RecordId },

    #[error("Version {version} not found for {} {id}", .resource.singular())]
    VersionNotFound {
        resource: Resource,
        id: RecordId,
        version: u32,
    },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The client-writable part of a record
pub trait RecordContent: Clone + Serialize + Send + Sync + 'static {
    /// Every constraint this content breaks, in field order
    fn violations(&self) -> Vec<FieldViolation>;

    /// Caller-supplied identifier, unique per organization among live records
    fn external_identifier(&self) -> Option<&str>;
}

/// Who created a record, taken from the authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Authenticated application id
    pub owner: String,

    /// RSIN of the caller's organization
    pub source_organization: String,
}

impl Provenance {
    pub fn validate(&self) -> StoreResult<()> {
        let mut violations = Vec::new();

        let digits = self.source_organization.len();
        if !(8..=9).contains(&digits)
            || !self.source_organization.chars().all(|c| c.is_ascii_digit())
        {
            violations.push(FieldViolation::new(
                "sourceOrganization",
                "must be 8 or 9 digits",
            ));
        }

        if self.owner.trim().is_empty() {
            violations.push(FieldViolation::new("owner", "must not be blank"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(violations))
        }
    }
}

/// A snapshot of record content at a given version
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry<C> {
    pub version: u32,
    pub recorded_at: DateTime<Utc>,
    pub content: C,
}

/// A stored record with its server-owned fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<C> {
    pub id: RecordId,

    pub source_organization: String,

    #[serde(flatten)]
    pub content: C,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub owner: String,

    /// Append-only version history, oldest first
    pub change_log: Vec<ChangeLogEntry<C>>,
}

impl<C> Record<C> {
    pub fn current_version(&self) -> u32 {
        self.change_log.last().map(|e| e.version).unwrap_or(0)
    }
}

/// Length checks shared by the content validators
pub(crate) fn check_required(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    value: &str,
    max: usize,
) {
    if value.trim().is_empty() {
        violations.push(FieldViolation::new(field, "must not be blank"));
    } else if value.chars().count() > max {
        violations.push(FieldViolation::new(
            field,
            format!("must be at most {} characters", max),
        ));
    }
}

pub(crate) fn check_optional(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value {
        if value.chars().count() > max {
            violations.push(FieldViolation::new(
                field,
                format!("must be at most {} characters", max),
            ));
        }
    }
}

pub(crate) fn check_url(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value {
        check_optional(violations, field, Some(value), max);
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            violations.push(FieldViolation::new(field, "must be an http(s) URL"));
        }
    }
}
