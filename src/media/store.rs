//! Media storage: one versioned collection per kind

use std::sync::Arc;

use async_trait::async_trait;

use crate::resource::{Provenance, RecordId, StoreResult, VersionedStore};

use super::types::{MediaContent, MediaItem, MediaKind};

/// Storage collaborator for documents, images and films
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn load_by_id(&self, kind: MediaKind, id: RecordId) -> StoreResult<MediaItem>;

    /// All live items of a kind ordered by id
    async fn list(&self, kind: MediaKind) -> StoreResult<Vec<MediaItem>>;

    async fn create(
        &self,
        kind: MediaKind,
        content: MediaContent,
        provenance: Provenance,
    ) -> StoreResult<MediaItem>;

    async fn replace(
        &self,
        kind: MediaKind,
        id: RecordId,
        content: MediaContent,
    ) -> StoreResult<MediaItem>;

    async fn delete(&self, kind: MediaKind, id: RecordId) -> StoreResult<()>;

    async fn revert(&self, kind: MediaKind, id: RecordId, version: u32) -> StoreResult<MediaItem>;

    /// Number of live items of a kind
    fn count(&self, kind: MediaKind) -> usize;
}

/// In-memory media storage
pub struct InMemoryMediaRepository {
    documents: VersionedStore<MediaContent>,
    images: VersionedStore<MediaContent>,
    films: VersionedStore<MediaContent>,
}

impl Default for InMemoryMediaRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self {
            documents: VersionedStore::new(MediaKind::Document.resource()),
            images: VersionedStore::new(MediaKind::Image.resource()),
            films: VersionedStore::new(MediaKind::Film.resource()),
        }
    }

    fn store(&self, kind: MediaKind) -> &VersionedStore<MediaContent> {
        match kind {
            MediaKind::Document => &self.documents,
            MediaKind::Image => &self.images,
            MediaKind::Film => &self.films,
        }
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn load_by_id(&self, kind: MediaKind, id: RecordId) -> StoreResult<MediaItem> {
        self.store(kind).load(id)
    }

    async fn list(&self, kind: MediaKind) -> StoreResult<Vec<MediaItem>> {
        Ok(self.store(kind).list())
    }

    async fn create(
        &self,
        kind: MediaKind,
        content: MediaContent,
        provenance: Provenance,
    ) -> StoreResult<MediaItem> {
        let store = self.store(kind);
        let item = store.create(content, provenance)?;
        tracing::debug!(
            resource = store.resource().name(),
            item_id = item.id,
            "Media item created"
        );
        Ok(item)
    }

    async fn replace(
        &self,
        kind: MediaKind,
        id: RecordId,
        content: MediaContent,
    ) -> StoreResult<MediaItem> {
        self.store(kind).replace(id, content)
    }

    async fn delete(&self, kind: MediaKind, id: RecordId) -> StoreResult<()> {
        self.store(kind).delete(id)
    }

    async fn revert(&self, kind: MediaKind, id: RecordId, version: u32) -> StoreResult<MediaItem> {
        self.store(kind).revert(id, version)
    }

    fn count(&self, kind: MediaKind) -> usize {
        self.store(kind).count()
    }
}

/// Create an Arc-wrapped in-memory media repository
pub fn create_media_repository() -> Arc<InMemoryMediaRepository> {
    Arc::new(InMemoryMediaRepository::new())
}
