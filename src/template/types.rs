//! Template types and error definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resource::{
    check_optional, check_required, check_url, summarize, FieldViolation, Record, RecordContent,
    RecordId, StoreError,
};

/// Repository-assigned template identifier
pub type TemplateId = RecordId;

/// Placeholder name to substitution value
pub type Variables = BTreeMap<String, String>;

/// A stored template
pub type Template = Record<TemplateContent>;

const MAX_EXTERNAL_IDENTIFIER: usize = 40;
const MAX_NAME: usize = 255;
const MAX_DESCRIPTION: usize = 255;
const MAX_BODY: usize = 2500;
const MAX_CONTACT_PERSON: usize = 255;
const MAX_PAGE_FIELD: usize = 255;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(TemplateId),

    #[error("Version {version} not found for template {id}")]
    VersionNotFound { id: TemplateId, version: u32 },

    #[error("Template syntax error in {field} at offset {offset}: {reason}")]
    Syntax {
        field: &'static str,
        offset: usize,
        reason: String,
    },

    #[error("Invalid variables: {0}")]
    InvalidVariables(String),

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for TemplateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => TemplateError::NotFound(id),
            StoreError::VersionNotFound { id, version, .. } => {
                TemplateError::VersionNotFound { id, version }
            }
            StoreError::Validation(violations) => TemplateError::Validation(violations),
            StoreError::Serialization(e) => TemplateError::Serialization(e),
        }
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Discriminates message templates from page templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Message,
    Page,
}

/// Publication metadata, only meaningful on page templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_robots: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_revisit_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_original_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_canonical: Option<String>,
}

impl PageMetadata {
    /// Wire name and value of every field
    fn fields(&self) -> [(&'static str, Option<&str>); 10] {
        [
            ("slug", self.slug.as_deref()),
            ("metaDescription", self.meta_description.as_deref()),
            ("metaKeywords", self.meta_keywords.as_deref()),
            ("metaRobots", self.meta_robots.as_deref()),
            ("metaRevisitAfter", self.meta_revisit_after.as_deref()),
            ("metaAuthor", self.meta_author.as_deref()),
            ("metaCopyright", self.meta_copyright.as_deref()),
            ("metaContact", self.meta_contact.as_deref()),
            ("metaOriginalSource", self.meta_original_source.as_deref()),
            ("metaCanonical", self.meta_canonical.as_deref()),
        ]
    }

    fn check(&self, kind: TemplateKind, violations: &mut Vec<FieldViolation>) {
        for (field, value) in self.fields() {
            if value.is_some() && kind != TemplateKind::Page {
                violations.push(FieldViolation::new(field, "only allowed on page templates"));
            } else {
                check_optional(violations, field, value, MAX_PAGE_FIELD);
            }
        }
    }
}

/// The client-writable part of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContent {
    /// Caller-supplied identifier, unique within the organization
    #[serde(default)]
    pub external_identifier: Option<String>,

    pub kind: TemplateKind,

    /// Name for internal use
    pub internal_name: String,

    /// Title shown to recipients, may contain placeholders
    pub external_title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Body text, may contain placeholders
    pub body: String,

    /// URL of the responsible contact person
    #[serde(default)]
    pub contact_person: Option<String>,

    #[serde(flatten)]
    pub page: PageMetadata,
}

impl TemplateContent {
    /// Validate every field, reporting all violations at once
    pub fn validate(&self) -> TemplateResult<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(TemplateError::Validation(violations))
        }
    }
}

impl RecordContent for TemplateContent {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        check_optional(
            &mut violations,
            "externalIdentifier",
            self.external_identifier.as_deref(),
            MAX_EXTERNAL_IDENTIFIER,
        );
        check_required(&mut violations, "internalName", &self.internal_name, MAX_NAME);
        check_required(&mut violations, "externalTitle", &self.external_title, MAX_NAME);
        check_optional(
            &mut violations,
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION,
        );
        check_required(&mut violations, "body", &self.body, MAX_BODY);
        check_url(
            &mut violations,
            "contactPerson",
            self.contact_person.as_deref(),
            MAX_CONTACT_PERSON,
        );
        self.page.check(self.kind, &mut violations);

        violations
    }

    fn external_identifier(&self) -> Option<&str> {
        self.external_identifier.as_deref()
    }
}

/// The result view of a render call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTemplate {
    pub id: TemplateId,

    /// Rendered title
    pub external_title: String,

    /// Rendered body
    pub body: String,

    /// Variables as supplied by the caller
    pub variables: Variables,
}
