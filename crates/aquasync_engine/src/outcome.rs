//! Results reported by the sync pipelines.

use aquasync_core::EntityKind;

/// Which pipeline is currently running, reported to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Sending local changes.
    Push,
    /// Applying server changes.
    Pull,
}

/// Counters from one push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushStats {
    /// Records sent, nested session values included.
    pub sent: usize,
    /// Records the server confirmed.
    pub synced: usize,
    /// Records the server rejected.
    pub conflicts: usize,
    /// Deletions the server confirmed.
    pub deletions_confirmed: usize,
}

/// Counters from one pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullStats {
    /// Records applied, per kind in wire order.
    pub applied: [usize; 8],
    /// Records skipped because the local copy won last-write-wins.
    pub kept_local: usize,
    /// Server deletions applied.
    pub deleted: usize,
    /// Server deletions skipped as contradictory or unresolvable.
    pub skipped_deletions: usize,
}

impl PullStats {
    /// Applied count for one kind.
    pub fn applied_for(&self, kind: EntityKind) -> usize {
        self.applied[kind.index()]
    }

    /// Total applied records across all kinds.
    pub fn total_applied(&self) -> usize {
        self.applied.iter().sum()
    }
}

/// Result of a push, pull, or full sync.
///
/// Pipelines report failure through this type rather than panicking or
/// leaking transport errors; `message` is suitable for direct display
/// in a status line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOutcome {
    /// Whether the operation succeeded end to end.
    pub success: bool,
    /// Human-readable summary or failure reason.
    pub message: String,
    /// Push counters, when a push ran.
    pub push: Option<PushStats>,
    /// Pull counters, when a pull ran.
    pub pull: Option<PullStats>,
}

impl SyncOutcome {
    /// A successful outcome with the given summary.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            push: None,
            pull: None,
        }
    }

    /// A failed outcome with the given reason.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            push: None,
            pull: None,
        }
    }

    /// Attaches push counters.
    #[must_use]
    pub fn with_push(mut self, stats: PushStats) -> Self {
        self.push = Some(stats);
        self
    }

    /// Attaches pull counters.
    #[must_use]
    pub fn with_pull(mut self, stats: PullStats) -> Self {
        self.pull = Some(stats);
        self
    }

    /// Combines a push outcome and a pull outcome into one full-sync
    /// summary of the form `Push: ...; Pull: ...`.
    pub fn combined(push: &SyncOutcome, pull: &SyncOutcome) -> Self {
        Self {
            success: push.success && pull.success,
            message: format!("Push: {}; Pull: {}", push.message, pull.message),
            push: push.push,
            pull: pull.pull,
        }
    }
}
