//! The pull pipeline: fetches server changes since the watermark and
//! applies them under the last-write-wins policy.

use std::collections::HashSet;

use tracing::{debug, warn};
use uuid::Uuid;

use aquasync_core::{Entity, EntityKind};
use aquasync_protocol::{PullQuery, PullResponse};

use crate::credentials::CredentialProvider;
use crate::engine::SyncEngine;
use crate::error::SyncResult;
use crate::outcome::{PullStats, SyncOutcome};
use crate::transport::SyncTransport;

impl<T: SyncTransport, C: CredentialProvider> SyncEngine<T, C> {
    pub(crate) fn pull_inner(&self) -> SyncResult<SyncOutcome> {
        let token = self.token()?;
        self.check_cancelled()?;

        let query = PullQuery {
            since_seconds: self.clock.since_seconds()?,
            client_id: self.config.client_id,
        };
        debug!(since = query.since_seconds, "pull: requesting changes");
        let response = self.transport.pull(&token, &query)?;

        let mut stats = PullStats::default();
        self.apply_entities(&response, &mut stats)?;
        self.apply_deletions(&response, &mut stats)?;

        // Advanced only after every record above has been applied;
        // cancellation or failure mid-apply re-fetches on the next
        // pull instead of skipping records.
        self.clock.advance_to_server_seconds(response.timestamp)?;

        let message = format!(
            "{} records applied, {} deleted",
            stats.total_applied(),
            stats.deleted
        );
        Ok(SyncOutcome::ok(message).with_pull(stats))
    }

    fn apply_entities(&self, response: &PullResponse, stats: &mut PullStats) -> SyncResult<()> {
        // Parents before children, matching wire order, so a pull that
        // is cancelled partway never leaves a child without its parent.
        for dto in &response.clients {
            self.apply_one(dto.clone().into_entity()?.into(), stats)?;
        }
        self.check_cancelled()?;
        for dto in &response.sites {
            self.apply_one(dto.clone().into_entity()?.into(), stats)?;
        }
        self.check_cancelled()?;
        for dto in &response.installations {
            self.apply_one(dto.clone().into_entity()?.into(), stats)?;
        }
        self.check_cancelled()?;
        for dto in &response.components {
            self.apply_one(dto.clone().into_entity()?.into(), stats)?;
        }
        self.check_cancelled()?;
        for dto in &response.maintenance_sessions {
            let applied = self.apply_one(dto.clone().into_entity()?.into(), stats)?;
            // A session may carry its values nested; they ride along
            // only when the session itself is applied.
            if applied {
                for value in dto.values.iter().flatten() {
                    self.apply_one(value.clone().into_entity()?.into(), stats)?;
                }
            }
        }
        self.check_cancelled()?;
        for dto in &response.maintenance_values {
            self.apply_one(dto.clone().into_entity()?.into(), stats)?;
        }
        self.check_cancelled()?;
        for dto in &response.component_templates {
            self.apply_one(dto.clone().into_entity()?.into(), stats)?;
        }
        self.check_cancelled()?;
        for dto in &response.component_template_fields {
            self.apply_one(dto.clone().into_entity()?.into(), stats)?;
        }
        Ok(())
    }

    /// Applies one remote record under last-write-wins. Returns whether
    /// the remote copy was taken.
    fn apply_one(&self, incoming: Entity, stats: &mut PullStats) -> SyncResult<bool> {
        let kind = incoming.kind();
        let id = incoming.id();

        match self.store.get(kind, id)? {
            None => {
                self.store.upsert(incoming)?;
                stats.applied[kind.index()] += 1;
                Ok(true)
            }
            Some(local) => {
                let remote_updated = incoming.meta().updated_at_epoch;
                if self.policy.remote_wins(kind, local.meta(), remote_updated) {
                    self.store.upsert(incoming)?;
                    stats.applied[kind.index()] += 1;
                    Ok(true)
                } else {
                    debug!(
                        kind = %kind,
                        %id,
                        local = local.meta().updated_at_epoch,
                        remote = remote_updated,
                        "pull: local copy wins, keeping it"
                    );
                    stats.kept_local += 1;
                    Ok(false)
                }
            }
        }
    }

    fn apply_deletions(&self, response: &PullResponse, stats: &mut PullStats) -> SyncResult<()> {
        if response.deleted.is_empty() {
            return Ok(());
        }
        let present: HashSet<String> = response.present_ids().into_iter().collect();

        for deletion in &response.deleted {
            self.check_cancelled()?;

            if deletion.record_id.trim().is_empty() {
                warn!(entity = %deletion.entity, "pull: deletion with empty id, skipping");
                stats.skipped_deletions += 1;
                continue;
            }
            // A record both updated and deleted in one response means
            // the server confused "archived" with "deleted"; the
            // update wins and the deletion is dropped.
            if present.contains(deletion.record_id.as_str()) {
                warn!(
                    entity = %deletion.entity,
                    record_id = %deletion.record_id,
                    "pull: deletion contradicts entity list, skipping"
                );
                stats.skipped_deletions += 1;
                continue;
            }
            let Ok(kind) = deletion.entity.parse::<EntityKind>() else {
                warn!(entity = %deletion.entity, "pull: deletion for unknown entity type, skipping");
                stats.skipped_deletions += 1;
                continue;
            };
            let Ok(id) = Uuid::parse_str(&deletion.record_id) else {
                warn!(record_id = %deletion.record_id, "pull: deletion with malformed id, skipping");
                stats.skipped_deletions += 1;
                continue;
            };

            self.store.hard_delete(kind, id)?;
            stats.deleted += 1;
        }
        Ok(())
    }
}
