//! The push pipeline: sends dirty records and pending deletions, then
//! reconciles the server's per-record verdicts.

use std::collections::HashSet;

use tracing::{debug, warn};
use uuid::Uuid;

use aquasync_core::{Entity, EntityKind};
use aquasync_protocol::{
    ClientDto, ComponentDto, ComponentTemplateDto, DeletedRecordDto, InstallationDto,
    MaintenanceSessionDto, MaintenanceValueDto, ProcessedCounts, PushRequest, PushResponse,
    SiteDto, TemplateFieldDto,
};

use crate::credentials::CredentialProvider;
use crate::engine::SyncEngine;
use crate::error::SyncResult;
use crate::outcome::{PushStats, SyncOutcome};
use crate::transport::SyncTransport;

impl<T: SyncTransport, C: CredentialProvider> SyncEngine<T, C> {
    pub(crate) fn push_inner(&self) -> SyncResult<SyncOutcome> {
        let token = self.token()?;
        self.check_cancelled()?;

        let request = self.build_push_request()?;
        let pending_deletions = self.ledger.list_pending()?;

        if request.is_empty() {
            debug!("push: no local changes");
            return Ok(SyncOutcome::ok("no local changes").with_push(PushStats::default()));
        }

        debug!(
            records = request.total_records(),
            deletions = request.deleted.len(),
            "push: sending batch"
        );
        let response = self.transport.push(&token, &request)?;

        if !response.success {
            // The server answered 2xx but refused the batch as a whole;
            // nothing was confirmed, so nothing is marked.
            warn!("push: server reported failure for the whole batch");
            return Ok(SyncOutcome::failed("server rejected the push batch"));
        }

        let stats = self.reconcile_push(&request, &response)?;

        // Deletions have no per-record error channel; a successful
        // response confirms all of them.
        let confirmed: Vec<(EntityKind, Uuid)> = pending_deletions
            .iter()
            .map(|d| (d.kind, d.record_id))
            .collect();
        for (kind, id) in &confirmed {
            self.store.hard_delete(*kind, *id)?;
        }
        self.ledger.mark_synced(&confirmed)?;
        self.ledger.purge_synced()?;

        let stats = PushStats {
            deletions_confirmed: confirmed.len(),
            ..stats
        };
        let message = if stats.conflicts > 0 {
            format!(
                "{} records synced, {} conflicts",
                stats.synced, stats.conflicts
            )
        } else {
            format!("{} records synced", stats.synced)
        };
        Ok(SyncOutcome::ok(message).with_push(stats))
    }

    fn build_push_request(&self) -> SyncResult<PushRequest> {
        let mut request = PushRequest::default();

        for entity in self.store.list_dirty(EntityKind::Client)? {
            if let Entity::Client(e) = entity {
                request.clients.push(ClientDto::from(&e));
            }
        }
        for entity in self.store.list_dirty(EntityKind::Site)? {
            if let Entity::Site(e) = entity {
                request.sites.push(SiteDto::from(&e));
            }
        }
        for entity in self.store.list_dirty(EntityKind::Installation)? {
            if let Entity::Installation(e) = entity {
                request.installations.push(InstallationDto::from(&e));
            }
        }
        for entity in self.store.list_dirty(EntityKind::Component)? {
            if let Entity::Component(e) = entity {
                request.components.push(ComponentDto::from(&e));
            }
        }

        // A dirty session carries all of its values nested so the
        // server stores the visit in one transaction; dirty values are
        // additionally sent standalone for sessions that are not dirty
        // themselves.
        let all_values = self.store.list(EntityKind::MaintenanceValue)?;
        for entity in self.store.list_dirty(EntityKind::MaintenanceSession)? {
            if let Entity::MaintenanceSession(session) = entity {
                let nested: Vec<MaintenanceValueDto> = all_values
                    .iter()
                    .filter_map(|v| match v {
                        Entity::MaintenanceValue(value)
                            if value.session_id == session.id
                                && value.meta.deleted_at_epoch.is_none() =>
                        {
                            Some(MaintenanceValueDto::from(value))
                        }
                        _ => None,
                    })
                    .collect();
                request
                    .maintenance_sessions
                    .push(MaintenanceSessionDto::from(&session).with_values(nested));
            }
        }
        for entity in self.store.list_dirty(EntityKind::MaintenanceValue)? {
            if let Entity::MaintenanceValue(e) = entity {
                request.maintenance_values.push(MaintenanceValueDto::from(&e));
            }
        }

        for entity in self.store.list_dirty(EntityKind::ComponentTemplate)? {
            if let Entity::ComponentTemplate(e) = entity {
                request
                    .component_templates
                    .push(ComponentTemplateDto::from(&e));
            }
        }
        for entity in self.store.list_dirty(EntityKind::TemplateField)? {
            if let Entity::TemplateField(e) = entity {
                request
                    .component_template_fields
                    .push(TemplateFieldDto::from(&e));
            }
        }

        for deletion in self.ledger.list_pending()? {
            request.deleted.push(DeletedRecordDto {
                entity: deletion.kind.as_str().to_string(),
                record_id: deletion.record_id.to_string(),
                deleted_at_epoch: Some(deletion.deleted_at_epoch),
            });
        }
        Ok(request)
    }

    /// Marks records synced or conflicted from the server's verdicts.
    ///
    /// For each kind, `successIds = sentIds − errorIds`, clamped to the
    /// first `processed` entries as a guard against servers that only
    /// processed a prefix of the batch.
    fn reconcile_push(
        &self,
        request: &PushRequest,
        response: &PushResponse,
    ) -> SyncResult<PushStats> {
        let processed = response.processed.unwrap_or(ProcessedCounts::default());
        let mut stats = PushStats {
            sent: request.total_records(),
            ..Default::default()
        };

        for kind in EntityKind::ALL {
            let sent_ids = request.ids_for(kind);
            if sent_ids.is_empty() {
                continue;
            }

            let error_ids: HashSet<Uuid> = response
                .errors
                .iter()
                .filter(|e| e.entity_type == kind.as_str())
                .filter_map(|e| Uuid::parse_str(&e.entity_id).ok())
                .collect();
            let processed_count = processed.get(kind) as usize;

            if processed_count == 0 && error_ids.is_empty() {
                warn!(
                    kind = %kind,
                    sent = sent_ids.len(),
                    "push anomaly: server processed zero records without errors, marking nothing"
                );
                continue;
            }

            let success_ids: Vec<Uuid> = sent_ids
                .iter()
                .copied()
                .filter(|id| !error_ids.contains(id))
                .take(processed_count)
                .collect();

            self.store.mark_synced(kind, &success_ids)?;
            stats.synced += success_ids.len();

            if !error_ids.is_empty() {
                let conflict_ids: Vec<Uuid> = error_ids.iter().copied().collect();
                self.store.mark_conflict(kind, &conflict_ids)?;
                stats.conflicts += conflict_ids.len();
                warn!(kind = %kind, conflicts = conflict_ids.len(), "push: per-record conflicts");
            }
        }

        for error in &response.errors {
            if error.entity_type.parse::<EntityKind>().is_err() {
                warn!(
                    entity_type = %error.entity_type,
                    entity_id = %error.entity_id,
                    message = %error.message,
                    "push: error for unknown entity type"
                );
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::credentials::StaticCredentials;
    use crate::transport::MockTransport;
    use aquasync_core::{
        delete_with_tombstone, Client, EntityStore, MaintenanceSession, MaintenanceValue,
        MemoryLedger, MemorySettings, MemoryStore, Site, SyncStatus,
    };
    use aquasync_protocol::PushRecordError;
    use std::sync::Arc;

    struct Fixture {
        engine: SyncEngine<MockTransport, StaticCredentials>,
        transport: Arc<MockTransport>,
        store: Arc<MemoryStore>,
        ledger: Arc<MemoryLedger>,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(MemoryLedger::new());
        let engine = SyncEngine::new(
            SyncConfig::new("https://sync.example.com"),
            transport.clone(),
            Arc::new(StaticCredentials::new("tok")),
            store.clone(),
            ledger.clone(),
            Arc::new(MemorySettings::new()),
        );
        Fixture {
            engine,
            transport,
            store,
            ledger,
        }
    }

    fn ok_response(processed: ProcessedCounts) -> PushResponse {
        PushResponse {
            success: true,
            processed: Some(processed),
            errors: vec![],
        }
    }

    #[test]
    fn empty_push_makes_no_network_call() {
        let f = fixture();
        let outcome = f.engine.push();
        assert!(outcome.success);
        assert_eq!(outcome.push.unwrap(), PushStats::default());
        assert_eq!(f.transport.push_calls(), 0);
    }

    #[test]
    fn dirty_site_is_synced_and_second_push_is_noop() {
        let f = fixture();
        let site = Site::new(Uuid::new_v4(), "S1");
        let site_id = site.id;
        f.store.upsert(site.into()).unwrap();

        f.transport.set_push_response(ok_response(ProcessedCounts {
            sites: 1,
            ..Default::default()
        }));

        let outcome = f.engine.push();
        assert!(outcome.success);
        assert_eq!(outcome.push.unwrap().synced, 1);
        assert_eq!(f.transport.push_calls(), 1);

        let stored = f.store.get(EntityKind::Site, site_id).unwrap().unwrap();
        assert!(!stored.meta().dirty);
        assert_eq!(stored.meta().sync_status, SyncStatus::Synced);

        // No intervening writes: the second push must not touch the
        // network at all.
        let outcome = f.engine.push();
        assert!(outcome.success);
        assert_eq!(f.transport.push_calls(), 1);
    }

    #[test]
    fn one_error_leaves_one_conflict_among_synced() {
        let f = fixture();
        let clients: Vec<Client> = (0..5).map(|i| Client::new(format!("c{i}"))).collect();
        let bad_id = clients[2].id;
        for client in &clients {
            f.store.upsert(client.clone().into()).unwrap();
        }

        f.transport.set_push_response(PushResponse {
            success: true,
            processed: Some(ProcessedCounts {
                clients: 4,
                ..Default::default()
            }),
            errors: vec![PushRecordError {
                entity_type: "clients".into(),
                entity_id: bad_id.to_string(),
                message: "validation failed".into(),
            }],
        });

        let outcome = f.engine.push();
        assert!(outcome.success);
        let stats = outcome.push.unwrap();
        assert_eq!(stats.synced, 4);
        assert_eq!(stats.conflicts, 1);

        for client in &clients {
            let stored = f.store.get(EntityKind::Client, client.id).unwrap().unwrap();
            if client.id == bad_id {
                assert_eq!(stored.meta().sync_status, SyncStatus::Conflict);
                assert!(stored.meta().dirty);
            } else {
                assert_eq!(stored.meta().sync_status, SyncStatus::Synced);
                assert!(!stored.meta().dirty);
            }
        }
    }

    #[test]
    fn processed_clamp_limits_synced_records() {
        let f = fixture();
        let clients: Vec<Client> = (0..4).map(|i| Client::new(format!("c{i}"))).collect();
        for client in &clients {
            f.store.upsert(client.clone().into()).unwrap();
        }

        // Server claims it only processed 2 of the 4, with no errors.
        f.transport.set_push_response(ok_response(ProcessedCounts {
            clients: 2,
            ..Default::default()
        }));

        let outcome = f.engine.push();
        assert!(outcome.success);
        assert_eq!(outcome.push.unwrap().synced, 2);

        let still_dirty = f.store.list_dirty(EntityKind::Client).unwrap();
        assert_eq!(still_dirty.len(), 2);
    }

    #[test]
    fn zero_processed_anomaly_marks_nothing() {
        let f = fixture();
        let client = Client::new("c");
        let id = client.id;
        f.store.upsert(client.into()).unwrap();

        f.transport
            .set_push_response(ok_response(ProcessedCounts::default()));

        let outcome = f.engine.push();
        assert!(outcome.success);
        assert_eq!(outcome.push.unwrap().synced, 0);

        let stored = f.store.get(EntityKind::Client, id).unwrap().unwrap();
        assert!(stored.meta().dirty);
        assert_eq!(stored.meta().sync_status, SyncStatus::Queued);
    }

    #[test]
    fn failed_push_leaves_dirty_flags_untouched() {
        let f = fixture();
        let client = Client::new("c");
        let id = client.id;
        f.store.upsert(client.into()).unwrap();

        f.transport
            .fail_push(crate::transport::MockFailure::Server(500));
        let outcome = f.engine.push();
        assert!(!outcome.success);

        let stored = f.store.get(EntityKind::Client, id).unwrap().unwrap();
        assert!(stored.meta().dirty);
        assert_eq!(stored.meta().sync_status, SyncStatus::Queued);
    }

    #[test]
    fn confirmed_deletions_are_purged_and_rows_removed() {
        let f = fixture();
        let mut client = Client::new("c");
        client.meta.mark_synced();
        let id = client.id;
        f.store.upsert(client.into()).unwrap();
        delete_with_tombstone(f.store.as_ref(), f.ledger.as_ref(), EntityKind::Client, id)
            .unwrap();

        f.transport
            .set_push_response(ok_response(ProcessedCounts::default()));

        let outcome = f.engine.push();
        assert!(outcome.success);
        assert_eq!(outcome.push.unwrap().deletions_confirmed, 1);
        assert!(f.ledger.is_empty());
        assert!(f.store.get(EntityKind::Client, id).unwrap().is_none());

        let request = &f.transport.pushed_requests()[0];
        assert_eq!(request.deleted.len(), 1);
        assert_eq!(request.deleted[0].entity, "clients");
        assert_eq!(request.deleted[0].record_id, id.to_string());
    }

    #[test]
    fn dirty_session_nests_its_values() {
        let f = fixture();
        let session = MaintenanceSession::new(Uuid::new_v4(), Uuid::new_v4(), 1_000);
        let mut value = MaintenanceValue::new(session.id, Uuid::new_v4(), "pressure_bar");
        value.value_text = Some("3.5".into());
        value.meta.mark_synced(); // clean value, dirty session
        f.store.upsert(session.clone().into()).unwrap();
        f.store.upsert(value.into()).unwrap();

        f.transport.set_push_response(ok_response(ProcessedCounts {
            maintenance_sessions: 1,
            ..Default::default()
        }));

        let outcome = f.engine.push();
        assert!(outcome.success);

        let request = &f.transport.pushed_requests()[0];
        assert_eq!(request.maintenance_sessions.len(), 1);
        let nested = request.maintenance_sessions[0].values.as_ref().unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].field_key, "pressure_bar");
        // The clean value is not re-sent standalone.
        assert!(request.maintenance_values.is_empty());
    }

    #[test]
    fn whole_batch_rejection_marks_nothing() {
        let f = fixture();
        let client = Client::new("c");
        let id = client.id;
        f.store.upsert(client.into()).unwrap();

        f.transport.set_push_response(PushResponse {
            success: false,
            processed: None,
            errors: vec![],
        });

        let outcome = f.engine.push();
        assert!(!outcome.success);
        let stored = f.store.get(EntityKind::Client, id).unwrap().unwrap();
        assert!(stored.meta().dirty);
    }
}
