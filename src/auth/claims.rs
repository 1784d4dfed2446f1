use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::resource::Provenance;

/// Claims carried by an application's bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (application ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// RSIN of the organization the application acts for
    #[serde(default)]
    pub organization: Option<String>,
    /// Additional custom claims
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    pub fn application_id(&self) -> &str {
        &self.sub
    }

    pub fn organization(&self) -> &str {
        self.organization.as_deref().unwrap_or_default()
    }

    /// Ownership fields recorded on records this caller creates
    pub fn provenance(&self) -> Provenance {
        Provenance {
            owner: self.sub.clone(),
            source_organization: self.organization().to_string(),
        }
    }
}
