//! Media item types: documents, images and films

use serde::{Deserialize, Serialize};

use crate::resource::{
    check_optional, check_required, check_url, FieldViolation, Record, RecordContent, Resource,
};

/// A stored media item
pub type MediaItem = Record<MediaContent>;

const MAX_EXTERNAL_IDENTIFIER: usize = 40;
const MAX_FIELD: usize = 255;

/// The three media collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Document,
    Image,
    Film,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Document, MediaKind::Image, MediaKind::Film];

    pub fn resource(self) -> Resource {
        match self {
            MediaKind::Document => Resource::Documents,
            MediaKind::Image => Resource::Images,
            MediaKind::Film => Resource::Films,
        }
    }

    pub fn from_resource(resource: Resource) -> Option<Self> {
        match resource {
            Resource::Documents => Some(MediaKind::Document),
            Resource::Images => Some(MediaKind::Image),
            Resource::Films => Some(MediaKind::Film),
            Resource::Templates => None,
        }
    }

    /// Collection name, also the key of list responses
    pub fn collection(self) -> &'static str {
        self.resource().name()
    }
}

/// The client-writable part of a media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    /// Caller-supplied identifier, unique within the organization
    #[serde(default)]
    pub external_identifier: Option<String>,

    pub name: String,

    /// File name as uploaded
    pub original_name: String,

    /// Size in bytes
    #[serde(default)]
    pub size: Option<u64>,

    pub extension: String,

    /// IANA media type, e.g. `image/png`
    #[serde(default)]
    pub mime_type: Option<String>,

    /// Where the file can be fetched
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub base64: Option<String>,

    /// URL of the responsible contact person
    #[serde(default)]
    pub contact_person: Option<String>,
}

impl RecordContent for MediaContent {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        check_optional(
            &mut violations,
            "externalIdentifier",
            self.external_identifier.as_deref(),
            MAX_EXTERNAL_IDENTIFIER,
        );
        check_required(&mut violations, "name", &self.name, MAX_FIELD);
        check_required(&mut violations, "originalName", &self.original_name, MAX_FIELD);
        check_required(&mut violations, "extension", &self.extension, MAX_FIELD);
        if let Some(mime) = self.mime_type.as_deref() {
            check_optional(&mut violations, "mimeType", Some(mime), MAX_FIELD);
            if !mime.contains('/') {
                violations.push(FieldViolation::new("mimeType", "must be a type/subtype pair"));
            }
        }
        check_url(&mut violations, "url", self.url.as_deref(), MAX_FIELD);
        check_url(
            &mut violations,
            "contactPerson",
            self.contact_person.as_deref(),
            MAX_FIELD,
        );

        violations
    }

    fn external_identifier(&self) -> Option<&str> {
        self.external_identifier.as_deref()
    }
}
