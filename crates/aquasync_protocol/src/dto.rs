//! Wire representations of the synchronizable entities.
//!
//! DTO field names follow the server's JSON contract: camelCase inside
//! records, snake_case for the per-kind arrays at the message level.
//! Outbound conversion carries the full local envelope; inbound
//! conversion always produces a clean, synced, non-tombstoned record —
//! the server never transmits dirty state, and deletions travel in the
//! `deleted` list instead of the entity arrays.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aquasync_core::{
    Client, Component, ComponentTemplate, ComponentType, EpochMillis, FieldType, Installation,
    MaintenanceSession, MaintenanceValue, Site, SyncMeta, TemplateField,
};

use crate::error::{ProtocolError, ProtocolResult};

fn parse_id(field: &str, raw: &str) -> ProtocolResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| ProtocolError::malformed(format!("{field}: invalid uuid {raw:?}")))
}

/// Wire form of a [`Client`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDto {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time, ms.
    pub created_at_epoch: EpochMillis,
    /// Last modification time, ms.
    pub updated_at_epoch: EpochMillis,
    /// Archive flag.
    #[serde(default)]
    pub is_archived: bool,
    /// Archive time, ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at_epoch: Option<EpochMillis>,
}

impl From<&Client> for ClientDto {
    fn from(e: &Client) -> Self {
        Self {
            id: e.id.to_string(),
            name: e.name.clone(),
            contact_name: e.contact_name.clone(),
            phone: e.phone.clone(),
            email: e.email.clone(),
            address: e.address.clone(),
            notes: e.notes.clone(),
            created_at_epoch: e.meta.created_at_epoch,
            updated_at_epoch: e.meta.updated_at_epoch,
            is_archived: e.meta.is_archived,
            archived_at_epoch: e.meta.archived_at_epoch,
        }
    }
}

impl ClientDto {
    /// Builds the local entity form of this remote record.
    pub fn into_entity(self) -> ProtocolResult<Client> {
        Ok(Client {
            id: parse_id("client.id", &self.id)?,
            name: self.name,
            contact_name: self.contact_name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            notes: self.notes,
            meta: remote_meta(
                self.created_at_epoch,
                self.updated_at_epoch,
                self.is_archived,
                self.archived_at_epoch,
            ),
        })
    }
}

/// Wire form of a [`Site`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDto {
    /// Record id.
    pub id: String,
    /// Owning client id.
    pub client_id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time, ms.
    pub created_at_epoch: EpochMillis,
    /// Last modification time, ms.
    pub updated_at_epoch: EpochMillis,
    /// Archive flag.
    #[serde(default)]
    pub is_archived: bool,
    /// Archive time, ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at_epoch: Option<EpochMillis>,
}

impl From<&Site> for SiteDto {
    fn from(e: &Site) -> Self {
        Self {
            id: e.id.to_string(),
            client_id: e.client_id.to_string(),
            name: e.name.clone(),
            address: e.address.clone(),
            latitude: e.latitude,
            longitude: e.longitude,
            notes: e.notes.clone(),
            created_at_epoch: e.meta.created_at_epoch,
            updated_at_epoch: e.meta.updated_at_epoch,
            is_archived: e.meta.is_archived,
            archived_at_epoch: e.meta.archived_at_epoch,
        }
    }
}

impl SiteDto {
    /// Builds the local entity form of this remote record.
    pub fn into_entity(self) -> ProtocolResult<Site> {
        Ok(Site {
            id: parse_id("site.id", &self.id)?,
            client_id: parse_id("site.clientId", &self.client_id)?,
            name: self.name,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            notes: self.notes,
            meta: remote_meta(
                self.created_at_epoch,
                self.updated_at_epoch,
                self.is_archived,
                self.archived_at_epoch,
            ),
        })
    }
}

/// Wire form of an [`Installation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationDto {
    /// Record id.
    pub id: String,
    /// Owning site id.
    pub site_id: String,
    /// Display name.
    pub name: String,
    /// Installation kind label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_type: Option<String>,
    /// Commissioning time, ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commissioned_at_epoch: Option<EpochMillis>,
    /// Notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time, ms.
    pub created_at_epoch: EpochMillis,
    /// Last modification time, ms.
    pub updated_at_epoch: EpochMillis,
    /// Archive flag.
    #[serde(default)]
    pub is_archived: bool,
    /// Archive time, ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at_epoch: Option<EpochMillis>,
}

impl From<&Installation> for InstallationDto {
    fn from(e: &Installation) -> Self {
        Self {
            id: e.id.to_string(),
            site_id: e.site_id.to_string(),
            name: e.name.clone(),
            installation_type: e.installation_type.clone(),
            commissioned_at_epoch: e.commissioned_at_epoch,
            notes: e.notes.clone(),
            created_at_epoch: e.meta.created_at_epoch,
            updated_at_epoch: e.meta.updated_at_epoch,
            is_archived: e.meta.is_archived,
            archived_at_epoch: e.meta.archived_at_epoch,
        }
    }
}

impl InstallationDto {
    /// Builds the local entity form of this remote record.
    pub fn into_entity(self) -> ProtocolResult<Installation> {
        Ok(Installation {
            id: parse_id("installation.id", &self.id)?,
            site_id: parse_id("installation.siteId", &self.site_id)?,
            name: self.name,
            installation_type: self.installation_type,
            commissioned_at_epoch: self.commissioned_at_epoch,
            notes: self.notes,
            meta: remote_meta(
                self.created_at_epoch,
                self.updated_at_epoch,
                self.is_archived,
                self.archived_at_epoch,
            ),
        })
    }
}

/// Wire form of a [`Component`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDto {
    /// Record id.
    pub id: String,
    /// Owning installation id.
    pub installation_id: String,
    /// Display name.
    pub name: String,
    /// Equipment category.
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Source template id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Serial number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Parameters JSON document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_json: Option<String>,
    /// Notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time, ms.
    pub created_at_epoch: EpochMillis,
    /// Last modification time, ms.
    pub updated_at_epoch: EpochMillis,
    /// Archive flag.
    #[serde(default)]
    pub is_archived: bool,
    /// Archive time, ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at_epoch: Option<EpochMillis>,
}

impl From<&Component> for ComponentDto {
    fn from(e: &Component) -> Self {
        Self {
            id: e.id.to_string(),
            installation_id: e.installation_id.to_string(),
            name: e.name.clone(),
            component_type: e.component_type,
            template_id: e.template_id.map(|id| id.to_string()),
            serial_number: e.serial_number.clone(),
            params_json: e.params_json.clone(),
            notes: e.notes.clone(),
            created_at_epoch: e.meta.created_at_epoch,
            updated_at_epoch: e.meta.updated_at_epoch,
            is_archived: e.meta.is_archived,
            archived_at_epoch: e.meta.archived_at_epoch,
        }
    }
}

impl ComponentDto {
    /// Builds the local entity form of this remote record.
    pub fn into_entity(self) -> ProtocolResult<Component> {
        let template_id = self
            .template_id
            .as_deref()
            .map(|raw| parse_id("component.templateId", raw))
            .transpose()?;
        Ok(Component {
            id: parse_id("component.id", &self.id)?,
            installation_id: parse_id("component.installationId", &self.installation_id)?,
            name: self.name,
            component_type: self.component_type,
            template_id,
            serial_number: self.serial_number,
            params_json: self.params_json,
            notes: self.notes,
            meta: remote_meta(
                self.created_at_epoch,
                self.updated_at_epoch,
                self.is_archived,
                self.archived_at_epoch,
            ),
        })
    }
}

/// Wire form of a [`MaintenanceSession`].
///
/// In push requests a session may carry its values nested; the server
/// stores both in one transaction. Pull responses always deliver values
/// in their own top-level array and leave `values` empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSessionDto {
    /// Record id.
    pub id: String,
    /// Site id.
    pub site_id: String,
    /// Installation id.
    pub installation_id: String,
    /// Visit start, ms.
    pub started_at_epoch: EpochMillis,
    /// Visit end, ms; absent while in progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_epoch: Option<EpochMillis>,
    /// Technician name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    /// Notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time, ms.
    pub created_at_epoch: EpochMillis,
    /// Last modification time, ms.
    pub updated_at_epoch: EpochMillis,
    /// Archive flag.
    #[serde(default)]
    pub is_archived: bool,
    /// Archive time, ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at_epoch: Option<EpochMillis>,
    /// Values recorded during the visit, nested so both sides can
    /// store the visit in one transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<MaintenanceValueDto>>,
}

impl From<&MaintenanceSession> for MaintenanceSessionDto {
    fn from(e: &MaintenanceSession) -> Self {
        Self {
            id: e.id.to_string(),
            site_id: e.site_id.to_string(),
            installation_id: e.installation_id.to_string(),
            started_at_epoch: e.started_at_epoch,
            finished_at_epoch: e.finished_at_epoch,
            technician: e.technician.clone(),
            notes: e.notes.clone(),
            created_at_epoch: e.meta.created_at_epoch,
            updated_at_epoch: e.meta.updated_at_epoch,
            is_archived: e.meta.is_archived,
            archived_at_epoch: e.meta.archived_at_epoch,
            values: None,
        }
    }
}

impl MaintenanceSessionDto {
    /// Attaches nested values to an outbound session.
    pub fn with_values(mut self, values: Vec<MaintenanceValueDto>) -> Self {
        if !values.is_empty() {
            self.values = Some(values);
        }
        self
    }

    /// Builds the local entity form of this remote record. Nested
    /// values, if any, are the caller's to apply separately.
    pub fn into_entity(self) -> ProtocolResult<MaintenanceSession> {
        Ok(MaintenanceSession {
            id: parse_id("session.id", &self.id)?,
            site_id: parse_id("session.siteId", &self.site_id)?,
            installation_id: parse_id("session.installationId", &self.installation_id)?,
            started_at_epoch: self.started_at_epoch,
            finished_at_epoch: self.finished_at_epoch,
            technician: self.technician,
            notes: self.notes,
            meta: remote_meta(
                self.created_at_epoch,
                self.updated_at_epoch,
                self.is_archived,
                self.archived_at_epoch,
            ),
        })
    }
}

/// Wire form of a [`MaintenanceValue`].
///
/// Numeric readings are stored locally as text; the wire carries them
/// in `valueNumber` as well so the server can aggregate without
/// re-parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceValueDto {
    /// Record id.
    pub id: String,
    /// Owning session id.
    pub session_id: String,
    /// Site id, denormalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    /// Installation id, denormalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_id: Option<String>,
    /// Component id.
    pub component_id: String,
    /// Template field key.
    pub field_key: String,
    /// Text value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_text: Option<String>,
    /// Numeric value, mirrored from `valueText` when it parses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_number: Option<f64>,
    /// Checkbox value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_bool: Option<bool>,
    /// Creation time, ms.
    pub created_at_epoch: EpochMillis,
    /// Last modification time, ms.
    pub updated_at_epoch: EpochMillis,
}

impl From<&MaintenanceValue> for MaintenanceValueDto {
    fn from(e: &MaintenanceValue) -> Self {
        Self {
            id: e.id.to_string(),
            session_id: e.session_id.to_string(),
            site_id: e.site_id.map(|id| id.to_string()),
            installation_id: e.installation_id.map(|id| id.to_string()),
            component_id: e.component_id.to_string(),
            field_key: e.field_key.clone(),
            value_text: e.value_text.clone(),
            value_number: e.value_text.as_deref().and_then(|s| s.trim().parse().ok()),
            value_bool: e.value_bool,
            created_at_epoch: e.meta.created_at_epoch,
            updated_at_epoch: e.meta.updated_at_epoch,
        }
    }
}

impl MaintenanceValueDto {
    /// Builds the local entity form of this remote record. When the
    /// server sends only `valueNumber`, the text form is reconstructed
    /// from it.
    pub fn into_entity(self) -> ProtocolResult<MaintenanceValue> {
        let site_id = self
            .site_id
            .as_deref()
            .map(|raw| parse_id("value.siteId", raw))
            .transpose()?;
        let installation_id = self
            .installation_id
            .as_deref()
            .map(|raw| parse_id("value.installationId", raw))
            .transpose()?;
        let value_text = self
            .value_text
            .or_else(|| self.value_number.map(|n| n.to_string()));
        Ok(MaintenanceValue {
            id: parse_id("value.id", &self.id)?,
            session_id: parse_id("value.sessionId", &self.session_id)?,
            site_id,
            installation_id,
            component_id: parse_id("value.componentId", &self.component_id)?,
            field_key: self.field_key,
            value_text,
            value_bool: self.value_bool,
            meta: SyncMeta::remote(self.created_at_epoch, self.updated_at_epoch),
        })
    }
}

/// Wire form of a [`ComponentTemplate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTemplateDto {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Equipment category.
    pub category: ComponentType,
    /// Default parameters JSON document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_params_json: Option<String>,
    /// Ordering hint.
    #[serde(default)]
    pub sort_order: i32,
    /// Creation time, ms.
    pub created_at_epoch: EpochMillis,
    /// Last modification time, ms.
    pub updated_at_epoch: EpochMillis,
    /// Archive flag.
    #[serde(default)]
    pub is_archived: bool,
    /// Archive time, ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at_epoch: Option<EpochMillis>,
}

impl From<&ComponentTemplate> for ComponentTemplateDto {
    fn from(e: &ComponentTemplate) -> Self {
        Self {
            id: e.id.to_string(),
            name: e.name.clone(),
            category: e.category,
            default_params_json: e.default_params_json.clone(),
            sort_order: e.sort_order,
            created_at_epoch: e.meta.created_at_epoch,
            updated_at_epoch: e.meta.updated_at_epoch,
            is_archived: e.meta.is_archived,
            archived_at_epoch: e.meta.archived_at_epoch,
        }
    }
}

impl ComponentTemplateDto {
    /// Builds the local entity form of this remote record.
    pub fn into_entity(self) -> ProtocolResult<ComponentTemplate> {
        Ok(ComponentTemplate {
            id: parse_id("template.id", &self.id)?,
            name: self.name,
            category: self.category,
            default_params_json: self.default_params_json,
            sort_order: self.sort_order,
            meta: remote_meta(
                self.created_at_epoch,
                self.updated_at_epoch,
                self.is_archived,
                self.archived_at_epoch,
            ),
        })
    }
}

/// Wire form of a [`TemplateField`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFieldDto {
    /// Record id.
    pub id: String,
    /// Owning template id.
    pub template_id: String,
    /// Machine key.
    pub key: String,
    /// Human-facing label.
    pub label: String,
    /// Value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Minimum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Maximum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Whether the field is a component characteristic.
    #[serde(default)]
    pub is_characteristic: bool,
    /// Whether the field is required.
    #[serde(default)]
    pub required: bool,
    /// Ordering hint.
    #[serde(default)]
    pub sort_order: i32,
    /// Creation time, ms.
    pub created_at_epoch: EpochMillis,
    /// Last modification time, ms.
    pub updated_at_epoch: EpochMillis,
}

impl From<&TemplateField> for TemplateFieldDto {
    fn from(e: &TemplateField) -> Self {
        Self {
            id: e.id.to_string(),
            template_id: e.template_id.to_string(),
            key: e.key.clone(),
            label: e.label.clone(),
            field_type: e.field_type,
            unit: e.unit.clone(),
            min_value: e.min_value,
            max_value: e.max_value,
            is_characteristic: e.is_characteristic,
            required: e.required,
            sort_order: e.sort_order,
            created_at_epoch: e.meta.created_at_epoch,
            updated_at_epoch: e.meta.updated_at_epoch,
        }
    }
}

impl TemplateFieldDto {
    /// Builds the local entity form of this remote record.
    pub fn into_entity(self) -> ProtocolResult<TemplateField> {
        Ok(TemplateField {
            id: parse_id("field.id", &self.id)?,
            template_id: parse_id("field.templateId", &self.template_id)?,
            key: self.key,
            label: self.label,
            field_type: self.field_type,
            unit: self.unit,
            min_value: self.min_value,
            max_value: self.max_value,
            is_characteristic: self.is_characteristic,
            required: self.required,
            sort_order: self.sort_order,
            meta: SyncMeta::remote(self.created_at_epoch, self.updated_at_epoch),
        })
    }
}

/// One entry in a push request's or pull response's `deleted` list.
///
/// Some server versions emit the kind under `tableName` instead of
/// `entity`; both spellings are accepted on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedRecordDto {
    /// Wire name of the deleted record's kind.
    #[serde(alias = "tableName")]
    pub entity: String,
    /// Deleted record id.
    #[serde(rename = "recordId")]
    pub record_id: String,
    /// When the deletion happened, ms. Pull responses may omit it.
    #[serde(
        rename = "deletedAtEpoch",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deleted_at_epoch: Option<EpochMillis>,
}

fn remote_meta(
    created: EpochMillis,
    updated: EpochMillis,
    is_archived: bool,
    archived_at: Option<EpochMillis>,
) -> SyncMeta {
    let mut meta = SyncMeta::remote(created, updated);
    meta.is_archived = is_archived;
    meta.archived_at_epoch = archived_at;
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquasync_core::SyncStatus;

    #[test]
    fn client_dto_uses_camel_case() {
        let mut client = Client::new("Aqua Nord");
        client.contact_name = Some("M. Fischer".into());
        let json = serde_json::to_value(ClientDto::from(&client)).unwrap();

        assert!(json.get("contactName").is_some());
        assert!(json.get("createdAtEpoch").is_some());
        assert!(json.get("contact_name").is_none());
    }

    #[test]
    fn inbound_records_arrive_clean_and_synced() {
        let client = Client::new("Aqua Nord");
        let entity = ClientDto::from(&client).into_entity().unwrap();
        assert!(!entity.meta.dirty);
        assert_eq!(entity.meta.sync_status, SyncStatus::Synced);
        assert!(entity.meta.deleted_at_epoch.is_none());
        assert_eq!(entity.id, client.id);
    }

    #[test]
    fn inbound_archive_state_is_preserved() {
        let mut site = Site::new(Uuid::new_v4(), "Main plant");
        site.meta.mark_archived();
        let entity = SiteDto::from(&site).into_entity().unwrap();
        assert!(entity.meta.is_archived);
        assert_eq!(entity.meta.archived_at_epoch, site.meta.archived_at_epoch);
        assert!(!entity.meta.dirty);
    }

    #[test]
    fn invalid_uuid_is_rejected() {
        let client = Client::new("Aqua Nord");
        let mut dto = ClientDto::from(&client);
        dto.id = "not-a-uuid".into();
        assert!(matches!(
            dto.into_entity(),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn component_type_serializes_screaming_snake() {
        let component = Component::new(Uuid::new_v4(), "RO-1", ComponentType::Ro);
        let json = serde_json::to_value(ComponentDto::from(&component)).unwrap();
        assert_eq!(json["type"], "RO");
    }

    #[test]
    fn numeric_value_is_mirrored_to_value_number() {
        let mut value = MaintenanceValue::new(Uuid::new_v4(), Uuid::new_v4(), "pressure_bar");
        value.value_text = Some("3.5".into());
        let dto = MaintenanceValueDto::from(&value);
        assert_eq!(dto.value_number, Some(3.5));

        value.value_text = Some("high".into());
        assert_eq!(MaintenanceValueDto::from(&value).value_number, None);
    }

    #[test]
    fn value_number_reconstructs_missing_text() {
        let value = MaintenanceValue::new(Uuid::new_v4(), Uuid::new_v4(), "pressure_bar");
        let mut dto = MaintenanceValueDto::from(&value);
        dto.value_text = None;
        dto.value_number = Some(3.5);
        let entity = dto.into_entity().unwrap();
        assert_eq!(entity.value_text.as_deref(), Some("3.5"));
    }

    #[test]
    fn session_with_values_nests_only_when_non_empty() {
        let session =
            MaintenanceSession::new(Uuid::new_v4(), Uuid::new_v4(), 1_700_000_000_000);
        let dto = MaintenanceSessionDto::from(&session).with_values(vec![]);
        assert!(dto.values.is_none());

        let value = MaintenanceValue::new(session.id, Uuid::new_v4(), "k");
        let dto = MaintenanceSessionDto::from(&session)
            .with_values(vec![MaintenanceValueDto::from(&value)]);
        assert_eq!(dto.values.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn deleted_record_accepts_table_name_alias() {
        let dto: DeletedRecordDto = serde_json::from_str(
            r#"{"tableName":"clients","recordId":"abc","deletedAtEpoch":123}"#,
        )
        .unwrap();
        assert_eq!(dto.entity, "clients");
        assert_eq!(dto.deleted_at_epoch, Some(123));

        let dto: DeletedRecordDto =
            serde_json::from_str(r#"{"entity":"sites","recordId":"abc"}"#).unwrap();
        assert_eq!(dto.entity, "sites");
        assert!(dto.deleted_at_epoch.is_none());
    }
}
