//! Content template system.
//!
//! This module provides:
//! - The `Template` entity (messages and pages, with page metadata) and its validation
//! - A repository trait backed by the shared versioned store
//! - Variable substitution for `{{variable}}` placeholders in title and body
//! - Per-operation visibility profiles and collection filters
//! - The render request handler tying it together
//!
//! # Example
//!
//! ```ignore
//! let repository = create_template_repository();
//! let template = repository.create(content, provenance).await?;
//!
//! let handler = RenderRequestHandler::new(repository, VariablePolicy::Apply);
//! let variables = json!({ "user": "Alice" });
//! let outcome = handler
//!     .handle(RenderRequest {
//!         template_id: template.id,
//!         method: &Method::GET,
//!         route: Route::find(Resource::Templates, Operation::Render),
//!         variables: Some(&variables),
//!     })
//!     .await?;
//! ```

mod render;
mod store;
mod substitution;
mod types;
mod visibility;

pub use render::{
    parse_variables, RenderOutcome, RenderRequest, RenderRequestHandler, RenderResponse,
    VariablePolicy, CONTENT_TYPE_JSON,
};
pub use store::{create_template_repository, InMemoryTemplateRepository, TemplateRepository};
pub use substitution::{render, RenderedText, BODY_FIELD, TITLE_FIELD};
pub use types::{
    PageMetadata, RenderedTemplate, Template, TemplateContent, TemplateError, TemplateId,
    TemplateKind, TemplateResult, Variables,
};
pub use visibility::{Profile, TEMPLATE_FILTERS};
