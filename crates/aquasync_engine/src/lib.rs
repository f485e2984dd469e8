//! # AquaSync Engine
//!
//! Bidirectional push/pull synchronization for AquaSync.
//!
//! The engine pushes dirty local records and pending deletions to the
//! server, reconciles the server's per-record verdicts, then pulls and
//! applies remote changes under a per-kind last-write-wins policy. A
//! full sync always runs push before pull so remote state never lands
//! on top of unflushed local edits.
//!
//! Storage, credentials, and the HTTP stack are all trait seams; see
//! [`transport::MockTransport`] for how the engine is exercised without
//! a network.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod http;
pub mod outcome;
mod pull;
mod push;
pub mod transport;

pub use config::{RetryConfig, SyncConfig};
pub use credentials::{CredentialProvider, StaticCredentials};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpResponse, HttpTransport};
pub use outcome::{PullStats, PushStats, SyncOutcome, SyncPhase};
pub use transport::{MockFailure, MockTransport, SyncTransport};
