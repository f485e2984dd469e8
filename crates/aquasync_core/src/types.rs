//! Core type definitions for AquaSync.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::CoreError;

/// Epoch timestamp in milliseconds.
///
/// All local sync metadata is kept in milliseconds; the wire protocol
/// transmits seconds. The conversion happens exactly once at each
/// transport boundary.
pub type EpochMillis = i64;

/// Returns the current time as epoch milliseconds.
pub fn now_epoch_ms() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

/// Synchronization status of a local record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncStatus {
    /// The record matches the server's last confirmed state.
    Synced,
    /// The record has local changes waiting for the next push.
    Queued,
    /// The server rejected the record during a push; needs retry or
    /// manual resolution.
    Conflict,
}

impl SyncStatus {
    /// Returns the stable integer value used by storage backends.
    pub const fn as_i32(self) -> i32 {
        match self {
            SyncStatus::Synced => 0,
            SyncStatus::Queued => 1,
            SyncStatus::Conflict => 2,
        }
    }

    /// Parses the stable integer value; unknown values map to `Queued`
    /// so a record is never silently treated as synced.
    pub const fn from_i32(value: i32) -> Self {
        match value {
            0 => SyncStatus::Synced,
            2 => SyncStatus::Conflict,
            _ => SyncStatus::Queued,
        }
    }
}

/// The eight synchronizable entity kinds, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A customer account at the top of the hierarchy.
    Client,
    /// A physical location belonging to a client.
    Site,
    /// A water-treatment installation at a site.
    Installation,
    /// A piece of equipment within an installation.
    Component,
    /// A maintenance visit covering an installation.
    MaintenanceSession,
    /// A single measured value captured during a session.
    MaintenanceValue,
    /// A reusable component template.
    ComponentTemplate,
    /// A field definition belonging to a component template.
    TemplateField,
}

impl EntityKind {
    /// All kinds in the order they appear on the wire.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Client,
        EntityKind::Site,
        EntityKind::Installation,
        EntityKind::Component,
        EntityKind::MaintenanceSession,
        EntityKind::MaintenanceValue,
        EntityKind::ComponentTemplate,
        EntityKind::TemplateField,
    ];

    /// Returns the stable wire name of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Client => "clients",
            EntityKind::Site => "sites",
            EntityKind::Installation => "installations",
            EntityKind::Component => "components",
            EntityKind::MaintenanceSession => "maintenance_sessions",
            EntityKind::MaintenanceValue => "maintenance_values",
            EntityKind::ComponentTemplate => "component_templates",
            EntityKind::TemplateField => "component_template_fields",
        }
    }

    /// Returns the position of this kind in [`EntityKind::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of equipment a [`crate::entities::Component`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    /// Mechanical or media filter.
    Filter,
    /// Reverse-osmosis unit.
    Ro,
    /// Compressor.
    Compressor,
    /// Aeration column.
    Aeration,
    /// Dosing pump.
    Dosing,
    /// Ion-exchange softener.
    Softener,
}

/// Value type of a [`crate::entities::TemplateField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Yes/no checkbox.
    Checkbox,
    /// Numeric reading.
    Number,
    /// Free text.
    Text,
}
