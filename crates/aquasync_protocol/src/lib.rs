//! # AquaSync Protocol
//!
//! Wire DTOs, push/pull message bodies, and the last-write-wins
//! conflict policy for AquaSync.
//!
//! This crate provides:
//! - Per-entity DTOs with JSON codecs matching the server contract
//! - `PushRequest`/`PushResponse` and `PullResponse` message bodies
//! - `LwwPolicy` for per-kind conflict resolution
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod dto;
pub mod error;
pub mod messages;
pub mod policy;

pub use dto::{
    ClientDto, ComponentDto, ComponentTemplateDto, DeletedRecordDto, InstallationDto,
    MaintenanceSessionDto, MaintenanceValueDto, SiteDto, TemplateFieldDto,
};
pub use error::{ProtocolError, ProtocolResult};
pub use messages::{
    ProcessedCounts, PullQuery, PullResponse, PushRecordError, PushRequest, PushResponse,
};
pub use policy::{LwwPolicy, TieBreak};
