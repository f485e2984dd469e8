//! Transport layer abstraction for sync operations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use aquasync_protocol::{PullQuery, PullResponse, PushRequest, PushResponse};

use crate::error::{SyncError, SyncResult};

/// A sync transport handles network communication with the sync server.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, mock for testing, etc.). The bearer token is
/// passed per call; the engine resolves it from its credential provider
/// at the start of each pipeline.
pub trait SyncTransport: Send + Sync {
    /// Pushes local changes to the server.
    fn push(&self, token: &str, request: &PushRequest) -> SyncResult<PushResponse>;

    /// Pulls changes from the server.
    fn pull(&self, token: &str, query: &PullQuery) -> SyncResult<PullResponse>;
}

/// A failure a [`MockTransport`] can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// The server rejects the token.
    AuthInvalid,
    /// The account lacks permission.
    Forbidden,
    /// A retryable network failure.
    Transport,
    /// A server error with the given status.
    Server(u16),
}

impl MockFailure {
    fn to_error(self) -> SyncError {
        match self {
            MockFailure::AuthInvalid => SyncError::AuthInvalid("mock 401".into()),
            MockFailure::Forbidden => SyncError::Forbidden("mock 403".into()),
            MockFailure::Transport => SyncError::transport_retryable("mock connection lost"),
            MockFailure::Server(status) => SyncError::Server {
                status,
                body: "mock server error".into(),
            },
        }
    }
}

/// A mock transport for testing.
///
/// Records every request it receives and replays canned responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    push_response: Mutex<Option<PushResponse>>,
    pull_response: Mutex<Option<PullResponse>>,
    push_failure: Mutex<Option<MockFailure>>,
    pull_failure: Mutex<Option<MockFailure>>,
    push_calls: AtomicUsize,
    pull_calls: AtomicUsize,
    pushed_requests: Mutex<Vec<PushRequest>>,
    pulled_queries: Mutex<Vec<PullQuery>>,
    seen_tokens: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Creates a new mock transport with no responses set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the push response.
    pub fn set_push_response(&self, response: PushResponse) {
        *self.push_response.lock().unwrap() = Some(response);
    }

    /// Sets the pull response.
    pub fn set_pull_response(&self, response: PullResponse) {
        *self.pull_response.lock().unwrap() = Some(response);
    }

    /// Makes the next push calls fail.
    pub fn fail_push(&self, failure: MockFailure) {
        *self.push_failure.lock().unwrap() = Some(failure);
    }

    /// Makes the next pull calls fail.
    pub fn fail_pull(&self, failure: MockFailure) {
        *self.pull_failure.lock().unwrap() = Some(failure);
    }

    /// Clears any configured failures.
    pub fn clear_failures(&self) {
        *self.push_failure.lock().unwrap() = None;
        *self.pull_failure.lock().unwrap() = None;
    }

    /// Number of push calls made.
    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }

    /// Number of pull calls made.
    pub fn pull_calls(&self) -> usize {
        self.pull_calls.load(Ordering::SeqCst)
    }

    /// Every push request received, in order.
    pub fn pushed_requests(&self) -> Vec<PushRequest> {
        self.pushed_requests.lock().unwrap().clone()
    }

    /// Every pull query received, in order.
    pub fn pulled_queries(&self) -> Vec<PullQuery> {
        self.pulled_queries.lock().unwrap().clone()
    }

    /// Every bearer token received, in order.
    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().unwrap().clone()
    }
}

impl SyncTransport for MockTransport {
    fn push(&self, token: &str, request: &PushRequest) -> SyncResult<PushResponse> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens.lock().unwrap().push(token.to_string());
        self.pushed_requests.lock().unwrap().push(request.clone());

        if let Some(failure) = *self.push_failure.lock().unwrap() {
            return Err(failure.to_error());
        }
        self.push_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SyncError::Protocol("no mock push response set".into()))
    }

    fn pull(&self, token: &str, query: &PullQuery) -> SyncResult<PullResponse> {
        self.pull_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens.lock().unwrap().push(token.to_string());
        self.pulled_queries.lock().unwrap().push(query.clone());

        if let Some(failure) = *self.pull_failure.lock().unwrap() {
            return Err(failure.to_error());
        }
        self.pull_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SyncError::Protocol("no mock pull response set".into()))
    }
}
