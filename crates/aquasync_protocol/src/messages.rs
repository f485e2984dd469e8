//! Push and pull message bodies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aquasync_core::EntityKind;

use crate::dto::{
    ClientDto, ComponentDto, ComponentTemplateDto, DeletedRecordDto, InstallationDto,
    MaintenanceSessionDto, MaintenanceValueDto, SiteDto, TemplateFieldDto,
};

/// Body of `POST /sync/push`.
///
/// Every kind is always present on the wire, empty arrays included, so
/// the server never has to distinguish "absent" from "no changes".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    /// Dirty clients.
    #[serde(default)]
    pub clients: Vec<ClientDto>,
    /// Dirty sites.
    #[serde(default)]
    pub sites: Vec<SiteDto>,
    /// Dirty installations.
    #[serde(default)]
    pub installations: Vec<InstallationDto>,
    /// Dirty components.
    #[serde(default)]
    pub components: Vec<ComponentDto>,
    /// Dirty maintenance sessions, possibly with nested values.
    #[serde(default)]
    pub maintenance_sessions: Vec<MaintenanceSessionDto>,
    /// Dirty maintenance values pushed standalone.
    #[serde(default)]
    pub maintenance_values: Vec<MaintenanceValueDto>,
    /// Dirty component templates.
    #[serde(default)]
    pub component_templates: Vec<ComponentTemplateDto>,
    /// Dirty template fields.
    #[serde(default)]
    pub component_template_fields: Vec<TemplateFieldDto>,
    /// Pending local deletions.
    #[serde(default)]
    pub deleted: Vec<DeletedRecordDto>,
}

impl PushRequest {
    /// True when there is nothing to send, deletions included.
    pub fn is_empty(&self) -> bool {
        self.total_records() == 0 && self.deleted.is_empty()
    }

    /// Number of entity records in the request, nested session values
    /// counted, deletions not.
    pub fn total_records(&self) -> usize {
        let nested: usize = self
            .maintenance_sessions
            .iter()
            .map(|s| s.values.as_ref().map_or(0, Vec::len))
            .sum();
        self.clients.len()
            + self.sites.len()
            + self.installations.len()
            + self.components.len()
            + self.maintenance_sessions.len()
            + self.maintenance_values.len()
            + self.component_templates.len()
            + self.component_template_fields.len()
            + nested
    }

    /// Ids of the records sent for one kind, in request order. Ids that
    /// are not valid UUIDs are skipped; locally authored records always
    /// carry valid ids.
    pub fn ids_for(&self, kind: EntityKind) -> Vec<Uuid> {
        fn parse(ids: Vec<&str>) -> Vec<Uuid> {
            ids.into_iter()
                .filter_map(|raw| Uuid::parse_str(raw).ok())
                .collect()
        }
        match kind {
            EntityKind::Client => parse(self.clients.iter().map(|d| d.id.as_str()).collect()),
            EntityKind::Site => parse(self.sites.iter().map(|d| d.id.as_str()).collect()),
            EntityKind::Installation => {
                parse(self.installations.iter().map(|d| d.id.as_str()).collect())
            }
            EntityKind::Component => {
                parse(self.components.iter().map(|d| d.id.as_str()).collect())
            }
            EntityKind::MaintenanceSession => parse(
                self.maintenance_sessions
                    .iter()
                    .map(|d| d.id.as_str())
                    .collect(),
            ),
            EntityKind::MaintenanceValue => parse(
                self.maintenance_values
                    .iter()
                    .map(|d| d.id.as_str())
                    .collect(),
            ),
            EntityKind::ComponentTemplate => parse(
                self.component_templates
                    .iter()
                    .map(|d| d.id.as_str())
                    .collect(),
            ),
            EntityKind::TemplateField => parse(
                self.component_template_fields
                    .iter()
                    .map(|d| d.id.as_str())
                    .collect(),
            ),
        }
    }
}

/// Per-kind counts of records the server accepted during a push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedCounts {
    /// Accepted clients.
    #[serde(default)]
    pub clients: u32,
    /// Accepted sites.
    #[serde(default)]
    pub sites: u32,
    /// Accepted installations.
    #[serde(default)]
    pub installations: u32,
    /// Accepted components.
    #[serde(default)]
    pub components: u32,
    /// Accepted maintenance sessions.
    #[serde(default)]
    pub maintenance_sessions: u32,
    /// Accepted maintenance values.
    #[serde(default)]
    pub maintenance_values: u32,
    /// Accepted component templates.
    #[serde(default)]
    pub component_templates: u32,
    /// Accepted template fields.
    #[serde(default)]
    pub component_template_fields: u32,
}

impl ProcessedCounts {
    /// The accepted count for one kind.
    pub fn get(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::Client => self.clients,
            EntityKind::Site => self.sites,
            EntityKind::Installation => self.installations,
            EntityKind::Component => self.components,
            EntityKind::MaintenanceSession => self.maintenance_sessions,
            EntityKind::MaintenanceValue => self.maintenance_values,
            EntityKind::ComponentTemplate => self.component_templates,
            EntityKind::TemplateField => self.component_template_fields,
        }
    }

    /// Total accepted records across all kinds.
    pub fn total(&self) -> u32 {
        EntityKind::ALL.iter().map(|k| self.get(*k)).sum()
    }
}

/// One per-record rejection in a push response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRecordError {
    /// Wire name of the rejected record's kind.
    pub entity_type: String,
    /// Rejected record id, as sent.
    pub entity_id: String,
    /// Server-provided reason.
    pub message: String,
}

/// Body of the `POST /sync/push` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushResponse {
    /// Overall success flag.
    pub success: bool,
    /// Per-kind accepted counts; absent on total failure.
    #[serde(default)]
    pub processed: Option<ProcessedCounts>,
    /// Per-record rejections.
    #[serde(default)]
    pub errors: Vec<PushRecordError>,
}

/// Query parameters of `GET /sync/pull`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullQuery {
    /// Unix timestamp in seconds; 1 when the device has never synced.
    pub since_seconds: i64,
    /// Account scope, present only for role-scoped accounts.
    pub client_id: Option<Uuid>,
}

/// Body of the `GET /sync/pull` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    /// Server time of this pull, Unix seconds. Becomes the next
    /// watermark once every record below has been applied.
    pub timestamp: i64,
    /// Changed clients.
    #[serde(default)]
    pub clients: Vec<ClientDto>,
    /// Changed sites.
    #[serde(default)]
    pub sites: Vec<SiteDto>,
    /// Changed installations.
    #[serde(default)]
    pub installations: Vec<InstallationDto>,
    /// Changed components.
    #[serde(default)]
    pub components: Vec<ComponentDto>,
    /// Changed maintenance sessions.
    #[serde(default)]
    pub maintenance_sessions: Vec<MaintenanceSessionDto>,
    /// Changed maintenance values.
    #[serde(default)]
    pub maintenance_values: Vec<MaintenanceValueDto>,
    /// Changed component templates.
    #[serde(default)]
    pub component_templates: Vec<ComponentTemplateDto>,
    /// Changed template fields.
    #[serde(default)]
    pub component_template_fields: Vec<TemplateFieldDto>,
    /// Records deleted server-side since the watermark.
    #[serde(default)]
    pub deleted: Vec<DeletedRecordDto>,
}

impl PullResponse {
    /// Ids of every entity record in this response, used to detect
    /// deletion entries that contradict the entity arrays.
    pub fn present_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        ids.extend(self.clients.iter().map(|d| d.id.clone()));
        ids.extend(self.sites.iter().map(|d| d.id.clone()));
        ids.extend(self.installations.iter().map(|d| d.id.clone()));
        ids.extend(self.components.iter().map(|d| d.id.clone()));
        ids.extend(self.maintenance_sessions.iter().map(|d| d.id.clone()));
        ids.extend(self.maintenance_values.iter().map(|d| d.id.clone()));
        ids.extend(self.component_templates.iter().map(|d| d.id.clone()));
        ids.extend(
            self.component_template_fields
                .iter()
                .map(|d| d.id.clone()),
        );
        ids
    }

    /// Number of entity records in the response, deletions not counted.
    pub fn total_records(&self) -> usize {
        self.clients.len()
            + self.sites.len()
            + self.installations.len()
            + self.components.len()
            + self.maintenance_sessions.len()
            + self.maintenance_values.len()
            + self.component_templates.len()
            + self.component_template_fields.len()
    }
}
