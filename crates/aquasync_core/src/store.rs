//! Entity storage contract and an in-memory implementation.
//!
//! The sync engine talks to storage exclusively through [`EntityStore`]
//! so the same engine runs against an embedded database on device and
//! against [`MemoryStore`] in tests.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::entities::Entity;
use crate::error::{CoreError, CoreResult};
use crate::types::EntityKind;

/// Storage backend for synchronizable entities.
///
/// Implementations must be safe to call from multiple threads; the
/// engine holds the store behind an `Arc`.
pub trait EntityStore: Send + Sync {
    /// Fetches a record by kind and id.
    fn get(&self, kind: EntityKind, id: Uuid) -> CoreResult<Option<Entity>>;

    /// Lists every record of a kind, tombstoned records included.
    fn list(&self, kind: EntityKind) -> CoreResult<Vec<Entity>>;

    /// Lists records of a kind with unconfirmed local changes.
    ///
    /// Tombstoned records are excluded; pending deletions travel
    /// through the deletion ledger, not the dirty list.
    fn list_dirty(&self, kind: EntityKind) -> CoreResult<Vec<Entity>>;

    /// Inserts or replaces a record.
    fn upsert(&self, entity: Entity) -> CoreResult<()>;

    /// Removes a record entirely. Missing records are not an error;
    /// deletion is idempotent.
    fn hard_delete(&self, kind: EntityKind, id: Uuid) -> CoreResult<()>;

    /// Marks the given records clean and synced. Ids with no matching
    /// record are skipped.
    fn mark_synced(&self, kind: EntityKind, ids: &[Uuid]) -> CoreResult<()>;

    /// Marks the given records as conflicted. The dirty flag is left
    /// set so the records are retried on a later push.
    fn mark_conflict(&self, kind: EntityKind, ids: &[Uuid]) -> CoreResult<()>;
}

/// Thread-safe in-memory store, one map per entity kind.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: [RwLock<HashMap<Uuid, Entity>>; 8],
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: EntityKind) -> &RwLock<HashMap<Uuid, Entity>> {
        &self.tables[kind.index()]
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.tables.iter().map(|t| t.read().len()).sum()
    }

    /// Whether the store holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntityStore for MemoryStore {
    fn get(&self, kind: EntityKind, id: Uuid) -> CoreResult<Option<Entity>> {
        Ok(self.table(kind).read().get(&id).cloned())
    }

    fn list(&self, kind: EntityKind) -> CoreResult<Vec<Entity>> {
        Ok(self.table(kind).read().values().cloned().collect())
    }

    fn list_dirty(&self, kind: EntityKind) -> CoreResult<Vec<Entity>> {
        Ok(self
            .table(kind)
            .read()
            .values()
            .filter(|e| e.meta().dirty && e.meta().deleted_at_epoch.is_none())
            .cloned()
            .collect())
    }

    fn upsert(&self, entity: Entity) -> CoreResult<()> {
        self.table(entity.kind()).write().insert(entity.id(), entity);
        Ok(())
    }

    fn hard_delete(&self, kind: EntityKind, id: Uuid) -> CoreResult<()> {
        self.table(kind).write().remove(&id);
        Ok(())
    }

    fn mark_synced(&self, kind: EntityKind, ids: &[Uuid]) -> CoreResult<()> {
        let mut table = self.table(kind).write();
        for id in ids {
            if let Some(entity) = table.get_mut(id) {
                entity.meta_mut().mark_synced();
            }
        }
        Ok(())
    }

    fn mark_conflict(&self, kind: EntityKind, ids: &[Uuid]) -> CoreResult<()> {
        let mut table = self.table(kind).write();
        for id in ids {
            if let Some(entity) = table.get_mut(id) {
                entity.meta_mut().mark_conflict();
            }
        }
        Ok(())
    }
}

/// Fetches a record that must exist.
pub fn require(store: &dyn EntityStore, kind: EntityKind, id: Uuid) -> CoreResult<Entity> {
    store
        .get(kind, id)?
        .ok_or(CoreError::NotFound { kind, id })
}
