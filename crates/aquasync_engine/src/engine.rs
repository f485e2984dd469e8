//! The sync engine: owns the pipelines and the orchestrator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use aquasync_core::{DeletionLedger, EntityStore, SettingsStore, SyncClock};
use aquasync_protocol::LwwPolicy;

use crate::config::SyncConfig;
use crate::credentials::CredentialProvider;
use crate::error::{SyncError, SyncResult};
use crate::outcome::{SyncOutcome, SyncPhase};
use crate::transport::SyncTransport;

/// Bidirectional sync engine.
///
/// One engine instance serves one device. Callers must serialize
/// overlapping invocations externally (a single-flight guard in the
/// caller); the engine does not take a global lock around a full sync,
/// only around individual store operations.
pub struct SyncEngine<T: SyncTransport, C: CredentialProvider> {
    pub(crate) config: SyncConfig,
    pub(crate) transport: Arc<T>,
    pub(crate) credentials: Arc<C>,
    pub(crate) store: Arc<dyn EntityStore>,
    pub(crate) ledger: Arc<dyn DeletionLedger>,
    pub(crate) clock: SyncClock,
    pub(crate) policy: LwwPolicy,
    cancelled: AtomicBool,
}

impl<T: SyncTransport, C: CredentialProvider> SyncEngine<T, C> {
    /// Creates a new sync engine.
    pub fn new(
        config: SyncConfig,
        transport: Arc<T>,
        credentials: Arc<C>,
        store: Arc<dyn EntityStore>,
        ledger: Arc<dyn DeletionLedger>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            config,
            transport,
            credentials,
            store,
            ledger,
            clock: SyncClock::new(settings),
            policy: LwwPolicy::default(),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Replaces the conflict policy.
    #[must_use]
    pub fn with_policy(mut self, policy: LwwPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Requests cancellation of the sync in progress. Applied pull
    /// records up to this point are kept; the watermark is not
    /// advanced.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn check_cancelled(&self) -> SyncResult<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(SyncError::Cancelled);
        }
        Ok(())
    }

    pub(crate) fn token(&self) -> SyncResult<String> {
        self.credentials.access_token().ok_or(SyncError::AuthMissing)
    }

    /// Pushes local changes to the server.
    ///
    /// Failures are reported through the outcome; local dirty flags are
    /// untouched on any failure, so the push is safe to retry whole.
    pub fn push(&self) -> SyncOutcome {
        self.cancelled.store(false, Ordering::SeqCst);
        self.push_inner().unwrap_or_else(outcome_from_error)
    }

    /// Pulls server changes and applies them under last-write-wins.
    pub fn pull(&self) -> SyncOutcome {
        self.cancelled.store(false, Ordering::SeqCst);
        self.pull_inner().unwrap_or_else(outcome_from_error)
    }

    /// Runs push then pull.
    ///
    /// Push always precedes pull; when push fails, pull is not
    /// attempted, so remote state never overwrites unflushed local
    /// changes.
    pub fn sync_full(&self) -> SyncOutcome {
        self.sync_full_with_progress(|_| {})
    }

    /// Runs push then pull, reporting each phase to `progress` just
    /// before it starts. The callback is fire-and-forget and cannot
    /// affect the result.
    pub fn sync_full_with_progress(&self, progress: impl Fn(SyncPhase)) -> SyncOutcome {
        self.cancelled.store(false, Ordering::SeqCst);
        self.run_full(&progress).unwrap_or_else(outcome_from_error)
    }

    /// Runs a full sync, retrying retryable failures with exponential
    /// backoff per the configured [`crate::config::RetryConfig`].
    pub fn sync_full_with_retry(&self) -> SyncOutcome {
        self.cancelled.store(false, Ordering::SeqCst);
        let max_attempts = self.config.retry.max_attempts.max(1);

        for attempt in 0..max_attempts {
            let delay = self.config.retry.delay_for_attempt(attempt);
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }

            match self.run_full(&|_| {}) {
                Ok(outcome) => return outcome,
                Err(err) if err.is_retryable() && attempt + 1 < max_attempts => {
                    warn!(attempt, error = %err, "sync attempt failed, will retry");
                }
                Err(err) => return outcome_from_error(err),
            }
        }
        // max_attempts >= 1 guarantees the loop returned.
        SyncOutcome::failed("sync retries exhausted")
    }

    fn run_full(&self, progress: &dyn Fn(SyncPhase)) -> SyncResult<SyncOutcome> {
        progress(SyncPhase::Push);
        info!("sync: push phase");
        let push = self.push_inner()?;
        if !push.success {
            debug!(message = %push.message, "push failed, skipping pull");
            return Ok(push);
        }

        progress(SyncPhase::Pull);
        info!("sync: pull phase");
        let pull = self.pull_inner()?;
        Ok(SyncOutcome::combined(&push, &pull))
    }
}

/// Maps an internal error to a failed outcome, so expected failure
/// conditions never escape the pipeline boundary.
pub(crate) fn outcome_from_error(err: SyncError) -> SyncOutcome {
    warn!(error = %err, "sync failed");
    SyncOutcome::failed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;
    use crate::transport::{MockFailure, MockTransport};
    use aquasync_core::{MemoryLedger, MemorySettings, MemoryStore};
    use aquasync_protocol::{PullResponse, PushResponse};

    fn engine_with(
        transport: Arc<MockTransport>,
        credentials: StaticCredentials,
    ) -> SyncEngine<MockTransport, StaticCredentials> {
        SyncEngine::new(
            SyncConfig::new("https://sync.example.com"),
            transport,
            Arc::new(credentials),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryLedger::new()),
            Arc::new(MemorySettings::new()),
        )
    }

    #[test]
    fn signed_out_device_makes_no_network_calls() {
        let transport = Arc::new(MockTransport::new());
        let engine = engine_with(transport.clone(), StaticCredentials::signed_out());

        let outcome = engine.sync_full();
        assert!(!outcome.success);
        assert!(outcome.message.contains("not authenticated"));
        assert_eq!(transport.push_calls(), 0);
        assert_eq!(transport.pull_calls(), 0);
    }

    #[test]
    fn failed_push_skips_pull() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_push(MockFailure::Server(500));
        let engine = engine_with(transport.clone(), StaticCredentials::new("tok"));

        // A dirty record forces a network push.
        engine
            .store
            .upsert(aquasync_core::Client::new("c").into())
            .unwrap();

        let outcome = engine.sync_full();
        assert!(!outcome.success);
        assert_eq!(transport.push_calls(), 1);
        assert_eq!(transport.pull_calls(), 0);
    }

    #[test]
    fn progress_reports_push_then_pull() {
        let transport = Arc::new(MockTransport::new());
        transport.set_push_response(PushResponse {
            success: true,
            processed: None,
            errors: vec![],
        });
        transport.set_pull_response(PullResponse {
            timestamp: 100,
            ..Default::default()
        });
        let engine = engine_with(transport, StaticCredentials::new("tok"));

        let phases = std::sync::Mutex::new(Vec::new());
        let outcome = engine.sync_full_with_progress(|phase| {
            phases.lock().unwrap().push(phase);
        });
        assert!(outcome.success);
        assert_eq!(
            *phases.lock().unwrap(),
            vec![SyncPhase::Push, SyncPhase::Pull]
        );
    }

    #[test]
    fn retry_recovers_from_transient_pull_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.set_push_response(PushResponse {
            success: true,
            processed: None,
            errors: vec![],
        });
        transport.fail_pull(MockFailure::Transport);
        let engine = SyncEngine::new(
            SyncConfig::new("https://sync.example.com").with_retry(
                crate::config::RetryConfig::new(3)
                    .with_initial_delay(std::time::Duration::from_millis(1)),
            ),
            transport.clone(),
            Arc::new(StaticCredentials::new("tok")),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryLedger::new()),
            Arc::new(MemorySettings::new()),
        );

        // First attempt fails in pull; clear the failure so the second
        // attempt succeeds.
        let handle = std::thread::spawn({
            let transport = transport.clone();
            move || {
                while transport.pull_calls() == 0 {
                    std::thread::yield_now();
                }
                transport.clear_failures();
                transport.set_pull_response(PullResponse {
                    timestamp: 100,
                    ..Default::default()
                });
            }
        });

        let outcome = engine.sync_full_with_retry();
        handle.join().unwrap();
        assert!(outcome.success, "outcome: {}", outcome.message);
        assert!(transport.pull_calls() >= 2);
    }

    /// Transport that observes the store during pull, to pin the
    /// ordering guarantee: dirty flags are already cleared by the time
    /// the pull phase reaches the network.
    struct OrderProbe {
        inner: MockTransport,
        store: Arc<MemoryStore>,
        dirty_during_pull: std::sync::atomic::AtomicUsize,
    }

    impl SyncTransport for OrderProbe {
        fn push(
            &self,
            token: &str,
            request: &aquasync_protocol::PushRequest,
        ) -> crate::error::SyncResult<PushResponse> {
            self.inner.push(token, request)
        }

        fn pull(
            &self,
            token: &str,
            query: &aquasync_protocol::PullQuery,
        ) -> crate::error::SyncResult<PullResponse> {
            let dirty = self
                .store
                .list_dirty(aquasync_core::EntityKind::Client)
                .unwrap()
                .len();
            self.dirty_during_pull
                .store(dirty, std::sync::atomic::Ordering::SeqCst);
            self.inner.pull(token, query)
        }
    }

    #[test]
    fn dirty_flags_are_cleared_before_pull_begins() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert(aquasync_core::Client::new("local edit").into())
            .unwrap();

        let probe = Arc::new(OrderProbe {
            inner: MockTransport::new(),
            store: store.clone(),
            dirty_during_pull: std::sync::atomic::AtomicUsize::new(usize::MAX),
        });
        probe.inner.set_push_response(PushResponse {
            success: true,
            processed: Some(aquasync_protocol::ProcessedCounts {
                clients: 1,
                ..Default::default()
            }),
            errors: vec![],
        });
        probe.inner.set_pull_response(PullResponse {
            timestamp: 100,
            ..Default::default()
        });

        let engine = SyncEngine::new(
            SyncConfig::new("https://sync.example.com"),
            probe.clone(),
            Arc::new(StaticCredentials::new("tok")),
            store,
            Arc::new(MemoryLedger::new()),
            Arc::new(MemorySettings::new()),
        );

        let outcome = engine.sync_full();
        assert!(outcome.success, "outcome: {}", outcome.message);
        assert_eq!(
            probe
                .dirty_during_pull
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[test]
    fn auth_failure_is_not_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_push(MockFailure::AuthInvalid);
        let engine = engine_with(transport.clone(), StaticCredentials::new("tok"));
        engine
            .store
            .upsert(aquasync_core::Client::new("c").into())
            .unwrap();

        let outcome = engine.sync_full_with_retry();
        assert!(!outcome.success);
        assert_eq!(transport.push_calls(), 1);
    }
}
