//! Versioned in-memory record storage with change log and revert

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::route_table::Resource;
use super::types::{
    ChangeLogEntry, FieldViolation, Provenance, Record, RecordContent, RecordId, StoreError,
    StoreResult,
};

struct StoredRecord<C> {
    record: Record<C>,
    deleted_at: Option<DateTime<Utc>>,
}

impl<C: RecordContent> StoredRecord<C> {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    fn apply(&mut self, content: C) {
        let now = Utc::now();
        let version = self.record.current_version() + 1;

        self.record.content = content.clone();
        self.record.updated_at = now;
        self.record.change_log.push(ChangeLogEntry {
            version,
            recorded_at: now,
            content,
        });
    }
}

/// Key of the external identifier index
type IdentifierKey = (String, String);

/// Storage for one resource collection.
///
/// Every server-owned field is assigned here: id, timestamps, owner,
/// organization and change log versions. External identifiers are claimed
/// in a separate index so two concurrent writers cannot both take one.
pub struct VersionedStore<C> {
    resource: Resource,
    records: DashMap<RecordId, StoredRecord<C>>,
    identifiers: DashMap<IdentifierKey, RecordId>,
    next_id: AtomicU64,
}

impl<C: RecordContent> VersionedStore<C> {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            records: DashMap::new(),
            identifiers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Number of live records
    pub fn count(&self) -> usize {
        self.records.iter().filter(|entry| entry.is_live()).count()
    }

    /// Load a live record by id
    pub fn load(&self, id: RecordId) -> StoreResult<Record<C>> {
        self.records
            .get(&id)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.record.clone())
            .ok_or_else(|| self.not_found(id))
    }

    /// All live records ordered by id
    pub fn list(&self) -> Vec<Record<C>> {
        let mut records: Vec<Record<C>> = self
            .records
            .iter()
            .filter(|entry| entry.is_live())
            .map(|entry| entry.record.clone())
            .collect();

        records.sort_by_key(|r| r.id);
        records
    }

    /// Validate and store new content
    pub fn create(&self, content: C, provenance: Provenance) -> StoreResult<Record<C>> {
        validate(&content)?;
        provenance.validate()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        // The claim is released before the record map is touched
        self.claim_identifier(
            &provenance.source_organization,
            content.external_identifier(),
            id,
        )?;

        let now = Utc::now();
        let record = Record {
            id,
            source_organization: provenance.source_organization,
            change_log: vec![ChangeLogEntry {
                version: 1,
                recorded_at: now,
                content: content.clone(),
            }],
            content,
            created_at: now,
            updated_at: now,
            owner: provenance.owner,
        };

        self.records.insert(
            id,
            StoredRecord {
                record: record.clone(),
                deleted_at: None,
            },
        );

        tracing::debug!(resource = self.resource.name(), id, "Record created");
        Ok(record)
    }

    /// Replace the content of a live record
    pub fn replace(&self, id: RecordId, content: C) -> StoreResult<Record<C>> {
        validate(&content)?;

        self.with_live(id, |stored| {
            self.switch_identifier(stored, &content)?;
            stored.apply(content);
            Ok(stored.record.clone())
        })
    }

    /// Logically delete a live record and free its external identifier
    pub fn delete(&self, id: RecordId) -> StoreResult<()> {
        self.with_live(id, |stored| {
            stored.deleted_at = Some(Utc::now());
            self.release_identifier(
                &stored.record.source_organization,
                stored.record.content.external_identifier(),
                id,
            );
            Ok(())
        })
    }

    /// Restore the content recorded at `version` as a new version
    pub fn revert(&self, id: RecordId, version: u32) -> StoreResult<Record<C>> {
        self.with_live(id, |stored| {
            let content = stored
                .record
                .change_log
                .iter()
                .find(|entry| entry.version == version)
                .map(|entry| entry.content.clone())
                .ok_or(StoreError::VersionNotFound {
                    resource: self.resource,
                    id,
                    version,
                })?;

            self.switch_identifier(stored, &content)?;
            stored.apply(content);
            tracing::debug!(resource = self.resource.name(), id, version, "Record reverted");
            Ok(stored.record.clone())
        })
    }

    fn not_found(&self, id: RecordId) -> StoreError {
        StoreError::NotFound {
            resource: self.resource,
            id,
        }
    }

    fn with_live<T>(
        &self,
        id: RecordId,
        f: impl FnOnce(&mut StoredRecord<C>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut entry = self
            .records
            .get_mut(&id)
            .filter(|entry| entry.is_live())
            .ok_or_else(|| self.not_found(id))?;

        f(&mut entry)
    }

    // Lock order is records then identifiers; `create` never holds both.

    fn claim_identifier(
        &self,
        organization: &str,
        identifier: Option<&str>,
        id: RecordId,
    ) -> StoreResult<()> {
        let Some(identifier) = identifier else {
            return Ok(());
        };

        match self
            .identifiers
            .entry((organization.to_string(), identifier.to_string()))
        {
            Entry::Occupied(entry) if *entry.get() != id => {
                Err(StoreError::Validation(vec![FieldViolation::new(
                    "externalIdentifier",
                    "is already used within this organization",
                )]))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(id);
                Ok(())
            }
        }
    }

    fn release_identifier(&self, organization: &str, identifier: Option<&str>, id: RecordId) {
        if let Some(identifier) = identifier {
            self.identifiers.remove_if(
                &(organization.to_string(), identifier.to_string()),
                |_, owner| *owner == id,
            );
        }
    }

    fn switch_identifier(&self, stored: &StoredRecord<C>, next: &C) -> StoreResult<()> {
        let record = &stored.record;
        let current = record.content.external_identifier();
        let wanted = next.external_identifier();

        if current != wanted {
            self.claim_identifier(&record.source_organization, wanted, record.id)?;
            self.release_identifier(&record.source_organization, current, record.id);
        }
        Ok(())
    }
}

fn validate<C: RecordContent>(content: &C) -> StoreResult<()> {
    let violations = content.violations();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(violations))
    }
}
