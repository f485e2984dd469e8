//! The sync envelope embedded in every synchronizable entity.

use serde::{Deserialize, Serialize};

use crate::types::{now_epoch_ms, EpochMillis, SyncStatus};

/// Sync bookkeeping shared by all entity kinds.
///
/// Embedded by composition rather than inheritance; an entity is
/// "dirty" when it carries local changes the server has not confirmed.
/// The invariant `dirty == true ⇒ sync_status != Synced` is upheld by
/// the constructors and mutators here, which are the only intended
/// write path for these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMeta {
    /// Creation time, set once.
    pub created_at_epoch: EpochMillis,
    /// Last local or remote modification time; authoritative for
    /// last-write-wins conflict resolution. Never decreases across
    /// local writes.
    pub updated_at_epoch: EpochMillis,
    /// Soft-deactivation flag, distinct from deletion.
    pub is_archived: bool,
    /// When the record was archived, if it is.
    pub archived_at_epoch: Option<EpochMillis>,
    /// Non-null marks the record as tombstoned locally, pending remote
    /// deletion.
    pub deleted_at_epoch: Option<EpochMillis>,
    /// True while the record has local changes not yet confirmed
    /// synced.
    pub dirty: bool,
    /// Current synchronization status.
    pub sync_status: SyncStatus,
}

impl SyncMeta {
    /// Envelope for a record created locally: dirty and queued.
    pub fn local_new() -> Self {
        let now = now_epoch_ms();
        Self {
            created_at_epoch: now,
            updated_at_epoch: now,
            is_archived: false,
            archived_at_epoch: None,
            deleted_at_epoch: None,
            dirty: true,
            sync_status: SyncStatus::Queued,
        }
    }

    /// Envelope for a record received from the server: clean and
    /// synced. Remote records never arrive tombstoned; deletions come
    /// through the pull response's `deleted` list instead.
    pub fn remote(created_at_epoch: EpochMillis, updated_at_epoch: EpochMillis) -> Self {
        Self {
            created_at_epoch,
            updated_at_epoch,
            is_archived: false,
            archived_at_epoch: None,
            deleted_at_epoch: None,
            dirty: false,
            sync_status: SyncStatus::Synced,
        }
    }

    /// Records a local mutation: bumps `updated_at_epoch` to now and
    /// queues the record for the next push.
    pub fn mark_updated(&mut self) {
        let now = now_epoch_ms();
        if self.created_at_epoch == 0 {
            self.created_at_epoch = now;
        }
        self.updated_at_epoch = self.updated_at_epoch.max(now);
        self.dirty = true;
        self.sync_status = SyncStatus::Queued;
    }

    /// Archives the record locally.
    pub fn mark_archived(&mut self) {
        self.is_archived = true;
        if self.archived_at_epoch.is_none() {
            self.archived_at_epoch = Some(now_epoch_ms());
        }
        self.mark_updated();
    }

    /// Reverses a local archive.
    pub fn mark_unarchived(&mut self) {
        self.is_archived = false;
        self.archived_at_epoch = None;
        self.mark_updated();
    }

    /// Tombstones the record locally, pending remote deletion.
    pub fn mark_deleted(&mut self) {
        if self.deleted_at_epoch.is_none() {
            self.deleted_at_epoch = Some(now_epoch_ms());
        }
        self.mark_updated();
    }

    /// Confirms the record reached the server.
    pub fn mark_synced(&mut self) {
        self.dirty = false;
        self.sync_status = SyncStatus::Synced;
    }

    /// Records a per-record server rejection. The dirty flag stays set
    /// so a future push retries or a human resolves the conflict.
    pub fn mark_conflict(&mut self) {
        self.sync_status = SyncStatus::Conflict;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_new_is_dirty_and_queued() {
        let meta = SyncMeta::local_new();
        assert!(meta.dirty);
        assert_eq!(meta.sync_status, SyncStatus::Queued);
        assert_eq!(meta.created_at_epoch, meta.updated_at_epoch);
        assert!(meta.deleted_at_epoch.is_none());
    }

    #[test]
    fn remote_is_clean_and_synced() {
        let meta = SyncMeta::remote(100, 200);
        assert!(!meta.dirty);
        assert_eq!(meta.sync_status, SyncStatus::Synced);
        assert_eq!(meta.created_at_epoch, 100);
        assert_eq!(meta.updated_at_epoch, 200);
    }

    #[test]
    fn update_never_decreases_timestamp() {
        let mut meta = SyncMeta::remote(100, i64::MAX - 1);
        meta.mark_updated();
        assert_eq!(meta.updated_at_epoch, i64::MAX - 1);
        assert!(meta.dirty);
        assert_eq!(meta.sync_status, SyncStatus::Queued);
    }

    #[test]
    fn archive_sets_timestamp_once() {
        let mut meta = SyncMeta::local_new();
        meta.mark_archived();
        let first = meta.archived_at_epoch;
        assert!(first.is_some());
        meta.mark_archived();
        assert_eq!(meta.archived_at_epoch, first);

        meta.mark_unarchived();
        assert!(!meta.is_archived);
        assert!(meta.archived_at_epoch.is_none());
    }

    #[test]
    fn delete_tombstones_and_queues() {
        let mut meta = SyncMeta::remote(100, 200);
        meta.mark_deleted();
        assert!(meta.deleted_at_epoch.is_some());
        assert!(meta.dirty);
        assert_eq!(meta.sync_status, SyncStatus::Queued);
    }

    #[test]
    fn conflict_leaves_dirty_flag_set() {
        let mut meta = SyncMeta::local_new();
        meta.mark_conflict();
        assert!(meta.dirty);
        assert_eq!(meta.sync_status, SyncStatus::Conflict);
    }

    #[test]
    fn dirty_implies_not_synced() {
        let mut meta = SyncMeta::local_new();
        assert!(meta.sync_status != SyncStatus::Synced);
        meta.mark_synced();
        assert!(!meta.dirty);
        meta.mark_updated();
        assert!(meta.dirty && meta.sync_status != SyncStatus::Synced);
    }
}
