//! Template storage with CRUD, change log and revert

use std::sync::Arc;

use async_trait::async_trait;

use crate::resource::{Provenance, Resource, VersionedStore};

use super::types::{Template, TemplateContent, TemplateId, TemplateResult};

/// Storage collaborator for templates.
///
/// The save paths assign every server-owned field explicitly: id,
/// timestamps, owner, organization and change log versions.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Load a live template by id
    async fn load_by_id(&self, id: TemplateId) -> TemplateResult<Template>;

    /// List all live templates ordered by id
    async fn list(&self) -> TemplateResult<Vec<Template>>;

    /// Validate and store a new template
    async fn create(
        &self,
        content: TemplateContent,
        provenance: Provenance,
    ) -> TemplateResult<Template>;

    /// Replace the content of an existing template
    async fn replace(&self, id: TemplateId, content: TemplateContent) -> TemplateResult<Template>;

    /// Logically delete a template
    async fn delete(&self, id: TemplateId) -> TemplateResult<()>;

    /// Restore the content recorded at `version`
    async fn revert(&self, id: TemplateId, version: u32) -> TemplateResult<Template>;

    /// Number of live templates
    fn count(&self) -> usize;
}

/// In-memory template storage
pub struct InMemoryTemplateRepository {
    store: VersionedStore<TemplateContent>,
}

impl Default for InMemoryTemplateRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTemplateRepository {
    pub fn new() -> Self {
        Self {
            store: VersionedStore::new(Resource::Templates),
        }
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn load_by_id(&self, id: TemplateId) -> TemplateResult<Template> {
        Ok(self.store.load(id)?)
    }

    async fn list(&self) -> TemplateResult<Vec<Template>> {
        Ok(self.store.list())
    }

    async fn create(
        &self,
        content: TemplateContent,
        provenance: Provenance,
    ) -> TemplateResult<Template> {
        let template = self.store.create(content, provenance)?;
        tracing::debug!(template_id = template.id, "Template created");
        Ok(template)
    }

    async fn replace(&self, id: TemplateId, content: TemplateContent) -> TemplateResult<Template> {
        Ok(self.store.replace(id, content)?)
    }

    async fn delete(&self, id: TemplateId) -> TemplateResult<()> {
        Ok(self.store.delete(id)?)
    }

    async fn revert(&self, id: TemplateId, version: u32) -> TemplateResult<Template> {
        Ok(self.store.revert(id, version)?)
    }

    fn count(&self) -> usize {
        self.store.count()
    }
}

/// Create an Arc-wrapped in-memory repository
pub fn create_template_repository() -> Arc<InMemoryTemplateRepository> {
    Arc::new(InMemoryTemplateRepository::new())
}
