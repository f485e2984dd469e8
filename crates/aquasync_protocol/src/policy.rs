//! Last-write-wins conflict policy.
//!
//! A pulled record replaces the local copy when its `updatedAtEpoch`
//! wins under the policy for its kind. Kinds differ in how ties are
//! resolved: most keep the local copy on equal timestamps, but sites
//! and components historically let the server win ties, and that
//! behavior is load-bearing for deployments where site and component
//! records are curated centrally. The asymmetry is therefore explicit
//! and configurable per kind rather than silently unified.

use aquasync_core::{EntityKind, EpochMillis, SyncMeta};

/// How equal `updatedAtEpoch` values are resolved for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// On a tie the local copy stays; the remote must be strictly
    /// newer to win.
    PreferLocal,
    /// On a tie the remote copy wins.
    PreferRemote,
}

impl TieBreak {
    /// Whether a remote record with the given timestamp replaces a
    /// local record with the given timestamp.
    pub fn remote_wins(self, remote: EpochMillis, local: EpochMillis) -> bool {
        match self {
            TieBreak::PreferLocal => remote > local,
            TieBreak::PreferRemote => remote >= local,
        }
    }
}

/// Per-kind last-write-wins policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LwwPolicy {
    tie_breaks: [TieBreak; 8],
}

impl Default for LwwPolicy {
    fn default() -> Self {
        let mut tie_breaks = [TieBreak::PreferLocal; 8];
        tie_breaks[EntityKind::Site.index()] = TieBreak::PreferRemote;
        tie_breaks[EntityKind::Component.index()] = TieBreak::PreferRemote;
        Self { tie_breaks }
    }
}

impl LwwPolicy {
    /// The default policy table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that resolves ties the same way for every kind.
    pub fn uniform(tie_break: TieBreak) -> Self {
        Self {
            tie_breaks: [tie_break; 8],
        }
    }

    /// Overrides the tie-break for one kind.
    #[must_use]
    pub fn with_tie_break(mut self, kind: EntityKind, tie_break: TieBreak) -> Self {
        self.tie_breaks[kind.index()] = tie_break;
        self
    }

    /// The tie-break in effect for a kind.
    pub fn tie_break(&self, kind: EntityKind) -> TieBreak {
        self.tie_breaks[kind.index()]
    }

    /// Whether a remote record should replace the local copy.
    ///
    /// A locally tombstoned record is only replaced when the remote is
    /// strictly newer than the deletion's own update, regardless of the
    /// kind's tie-break; otherwise the tombstone would resurrect on
    /// every pull that races the deletion push.
    pub fn remote_wins(
        &self,
        kind: EntityKind,
        local: &SyncMeta,
        remote_updated_at: EpochMillis,
    ) -> bool {
        if local.deleted_at_epoch.is_some() {
            return remote_updated_at > local.updated_at_epoch;
        }
        self.tie_break(kind)
            .remote_wins(remote_updated_at, local.updated_at_epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_at(updated: EpochMillis) -> SyncMeta {
        SyncMeta::remote(0, updated)
    }

    #[test]
    fn default_table_prefers_local_except_sites_and_components() {
        let policy = LwwPolicy::default();
        for kind in EntityKind::ALL {
            let expected = matches!(kind, EntityKind::Site | EntityKind::Component);
            assert_eq!(
                policy.tie_break(kind) == TieBreak::PreferRemote,
                expected,
                "unexpected tie-break for {kind}"
            );
        }
    }

    #[test]
    fn strictly_newer_remote_always_wins() {
        let policy = LwwPolicy::default();
        for kind in EntityKind::ALL {
            assert!(policy.remote_wins(kind, &local_at(100), 101));
            assert!(!policy.remote_wins(kind, &local_at(100), 99));
        }
    }

    #[test]
    fn tie_resolution_differs_by_kind() {
        let policy = LwwPolicy::default();
        assert!(!policy.remote_wins(EntityKind::Client, &local_at(100), 100));
        assert!(policy.remote_wins(EntityKind::Site, &local_at(100), 100));
        assert!(policy.remote_wins(EntityKind::Component, &local_at(100), 100));
    }

    #[test]
    fn tombstone_requires_strictly_newer_remote() {
        let policy = LwwPolicy::default();
        let mut local = local_at(100);
        local.deleted_at_epoch = Some(100);

        // Even the prefer-remote kinds do not resurrect on a tie.
        assert!(!policy.remote_wins(EntityKind::Site, &local, 100));
        assert!(policy.remote_wins(EntityKind::Site, &local, 101));
    }

    #[test]
    fn overrides_replace_single_kinds() {
        let policy = LwwPolicy::default()
            .with_tie_break(EntityKind::Site, TieBreak::PreferLocal)
            .with_tie_break(EntityKind::Client, TieBreak::PreferRemote);
        assert_eq!(policy.tie_break(EntityKind::Site), TieBreak::PreferLocal);
        assert_eq!(policy.tie_break(EntityKind::Client), TieBreak::PreferRemote);

        let uniform = LwwPolicy::uniform(TieBreak::PreferLocal);
        assert_eq!(uniform.tie_break(EntityKind::Component), TieBreak::PreferLocal);
    }
}
