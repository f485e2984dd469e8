//! Core domain model for AquaSync, an offline-first synchronization
//! layer for field-service CRM data.
//!
//! This crate defines the entity hierarchy (clients, sites,
//! installations, components, maintenance records, and component
//! templates), the [`SyncMeta`] envelope every entity carries, the
//! storage contracts the sync engine runs against, the deletion ledger,
//! and the pull watermark. The wire protocol lives in
//! `aquasync_protocol` and the engine itself in `aquasync_engine`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod entities;
pub mod error;
pub mod ledger;
pub mod meta;
pub mod settings;
pub mod store;
pub mod types;
pub mod watermark;

pub use entities::{
    Client, Component, ComponentTemplate, Entity, Installation, MaintenanceSession,
    MaintenanceValue, Site, Syncable, TemplateField,
};
pub use error::{CoreError, CoreResult};
pub use ledger::{delete_with_tombstone, DeletionLedger, DeletionRecord, MemoryLedger};
pub use meta::SyncMeta;
pub use settings::{MemorySettings, SettingsStore};
pub use store::{EntityStore, MemoryStore};
pub use types::{
    now_epoch_ms, ComponentType, EntityKind, EpochMillis, FieldType, SyncStatus,
};
pub use watermark::{SyncClock, WATERMARK_KEY};
