//! Deletion ledger: a durable record of local deletions pending
//! propagation to the server.
//!
//! A deleted record cannot announce its own deletion once the row is
//! gone, so deletions are written to the ledger first, then the record
//! is tombstoned. The ledger survives until the server confirms the
//! deletion, at which point the entry is marked synced and eventually
//! purged along with the tombstoned row.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::store::EntityStore;
use crate::types::{now_epoch_ms, EntityKind, EpochMillis};

/// One pending or confirmed deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionRecord {
    /// Kind of the deleted record.
    pub kind: EntityKind,
    /// Id of the deleted record.
    pub record_id: Uuid,
    /// When the local deletion happened.
    pub deleted_at_epoch: EpochMillis,
    /// Whether the server has confirmed the deletion.
    pub synced: bool,
}

/// Durable ledger of local deletions.
pub trait DeletionLedger: Send + Sync {
    /// Records a deletion. Recording the same (kind, id) twice keeps
    /// the earlier entry.
    fn record(&self, kind: EntityKind, record_id: Uuid) -> CoreResult<()>;

    /// Lists deletions not yet confirmed by the server.
    fn list_pending(&self) -> CoreResult<Vec<DeletionRecord>>;

    /// Marks the given deletions as confirmed.
    fn mark_synced(&self, ids: &[(EntityKind, Uuid)]) -> CoreResult<()>;

    /// Drops confirmed entries. Returns how many were removed.
    fn purge_synced(&self) -> CoreResult<usize>;
}

/// In-memory ledger used in tests and as the reference implementation.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<Vec<DeletionRecord>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entry count, confirmed entries included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl DeletionLedger for MemoryLedger {
    fn record(&self, kind: EntityKind, record_id: Uuid) -> CoreResult<()> {
        let mut entries = self.entries.write();
        if entries
            .iter()
            .any(|e| e.kind == kind && e.record_id == record_id)
        {
            return Ok(());
        }
        entries.push(DeletionRecord {
            kind,
            record_id,
            deleted_at_epoch: now_epoch_ms(),
            synced: false,
        });
        Ok(())
    }

    fn list_pending(&self) -> CoreResult<Vec<DeletionRecord>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| !e.synced)
            .cloned()
            .collect())
    }

    fn mark_synced(&self, ids: &[(EntityKind, Uuid)]) -> CoreResult<()> {
        let mut entries = self.entries.write();
        for entry in entries.iter_mut() {
            if ids.contains(&(entry.kind, entry.record_id)) {
                entry.synced = true;
            }
        }
        Ok(())
    }

    fn purge_synced(&self) -> CoreResult<usize> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| !e.synced);
        Ok(before - entries.len())
    }
}

/// Deletes a record with sync safety: the ledger entry is written
/// before the record is tombstoned, so a crash between the two steps
/// leaves the deletion recoverable rather than lost.
pub fn delete_with_tombstone(
    store: &dyn EntityStore,
    ledger: &dyn DeletionLedger,
    kind: EntityKind,
    id: Uuid,
) -> CoreResult<()> {
    ledger.record(kind, id)?;
    if let Some(mut entity) = store.get(kind, id)? {
        entity.meta_mut().mark_deleted();
        store.upsert(entity)?;
    }
    Ok(())
}
