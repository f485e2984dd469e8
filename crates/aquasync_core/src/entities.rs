//! Domain entities for the field-service hierarchy.
//!
//! Clients own sites, sites own installations, installations own
//! components. Maintenance sessions record a technician's visit and the
//! values measured during it. Component templates describe reusable
//! equipment configurations.
//!
//! Every entity embeds a [`SyncMeta`] envelope; the [`Entity`] sum type
//! lets the sync machinery treat all kinds uniformly while application
//! code keeps the concrete structs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::meta::SyncMeta;
use crate::types::{ComponentType, EntityKind, EpochMillis, FieldType};

/// A synchronizable entity with a stable kind and envelope access.
pub trait Syncable {
    /// The kind of this entity.
    const KIND: EntityKind;

    /// The stable record id.
    fn id(&self) -> Uuid;

    /// Shared sync envelope, read-only.
    fn meta(&self) -> &SyncMeta;

    /// Shared sync envelope, mutable.
    fn meta_mut(&mut self) -> &mut SyncMeta;
}

macro_rules! impl_syncable {
    ($ty:ident, $kind:expr) => {
        impl Syncable for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> Uuid {
                self.id
            }

            fn meta(&self) -> &SyncMeta {
                &self.meta
            }

            fn meta_mut(&mut self) -> &mut SyncMeta {
                &mut self.meta
            }
        }
    };
}

/// A customer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Stable record id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact person, if known.
    pub contact_name: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// Billing or visiting address.
    pub address: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sync envelope.
    pub meta: SyncMeta,
}

impl_syncable!(Client, EntityKind::Client);

impl Client {
    /// Creates a new locally-authored client queued for sync.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            contact_name: None,
            phone: None,
            email: None,
            address: None,
            notes: None,
            meta: SyncMeta::local_new(),
        }
    }
}

/// A physical location belonging to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Stable record id.
    pub id: Uuid,
    /// Owning client.
    pub client_id: Uuid,
    /// Display name.
    pub name: String,
    /// Street address of the site.
    pub address: Option<String>,
    /// Latitude, if geocoded.
    pub latitude: Option<f64>,
    /// Longitude, if geocoded.
    pub longitude: Option<f64>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sync envelope.
    pub meta: SyncMeta,
}

impl_syncable!(Site, EntityKind::Site);

impl Site {
    /// Creates a new locally-authored site queued for sync.
    pub fn new(client_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            name: name.into(),
            address: None,
            latitude: None,
            longitude: None,
            notes: None,
            meta: SyncMeta::local_new(),
        }
    }
}

/// A water-treatment installation at a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    /// Stable record id.
    pub id: Uuid,
    /// Owning site.
    pub site_id: Uuid,
    /// Display name.
    pub name: String,
    /// Installation kind label, free-form.
    pub installation_type: Option<String>,
    /// When the installation was commissioned.
    pub commissioned_at_epoch: Option<EpochMillis>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sync envelope.
    pub meta: SyncMeta,
}

impl_syncable!(Installation, EntityKind::Installation);

impl Installation {
    /// Creates a new locally-authored installation queued for sync.
    pub fn new(site_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            site_id,
            name: name.into(),
            installation_type: None,
            commissioned_at_epoch: None,
            notes: None,
            meta: SyncMeta::local_new(),
        }
    }
}

/// A piece of equipment within an installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Stable record id.
    pub id: Uuid,
    /// Owning installation.
    pub installation_id: Uuid,
    /// Display name.
    pub name: String,
    /// Equipment category.
    pub component_type: ComponentType,
    /// Template this component was instantiated from, if any.
    pub template_id: Option<Uuid>,
    /// Manufacturer serial number.
    pub serial_number: Option<String>,
    /// Component-specific parameters as a JSON document.
    pub params_json: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sync envelope.
    pub meta: SyncMeta,
}

impl_syncable!(Component, EntityKind::Component);

impl Component {
    /// Creates a new locally-authored component queued for sync.
    pub fn new(
        installation_id: Uuid,
        name: impl Into<String>,
        component_type: ComponentType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            installation_id,
            name: name.into(),
            component_type,
            template_id: None,
            serial_number: None,
            params_json: None,
            notes: None,
            meta: SyncMeta::local_new(),
        }
    }
}

/// A maintenance visit covering an installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSession {
    /// Stable record id.
    pub id: Uuid,
    /// Site the visit took place at.
    pub site_id: Uuid,
    /// Installation serviced during the visit.
    pub installation_id: Uuid,
    /// When the visit started.
    pub started_at_epoch: EpochMillis,
    /// When the visit finished; `None` while in progress.
    pub finished_at_epoch: Option<EpochMillis>,
    /// Name of the technician on site.
    pub technician: Option<String>,
    /// Free-form visit notes.
    pub notes: Option<String>,
    /// Sync envelope.
    pub meta: SyncMeta,
}

impl_syncable!(MaintenanceSession, EntityKind::MaintenanceSession);

impl MaintenanceSession {
    /// Creates a new locally-authored session queued for sync.
    pub fn new(site_id: Uuid, installation_id: Uuid, started_at_epoch: EpochMillis) -> Self {
        Self {
            id: Uuid::new_v4(),
            site_id,
            installation_id,
            started_at_epoch,
            finished_at_epoch: None,
            technician: None,
            notes: None,
            meta: SyncMeta::local_new(),
        }
    }
}

/// A single measured value captured during a maintenance session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceValue {
    /// Stable record id.
    pub id: Uuid,
    /// Owning session.
    pub session_id: Uuid,
    /// Site, denormalized for reporting queries.
    pub site_id: Option<Uuid>,
    /// Installation, denormalized for reporting queries.
    pub installation_id: Option<Uuid>,
    /// Component the reading was taken on.
    pub component_id: Uuid,
    /// Template field key this value answers.
    pub field_key: String,
    /// Text or numeric value, stored as text.
    pub value_text: Option<String>,
    /// Checkbox value.
    pub value_bool: Option<bool>,
    /// Sync envelope.
    pub meta: SyncMeta,
}

impl_syncable!(MaintenanceValue, EntityKind::MaintenanceValue);

impl MaintenanceValue {
    /// Creates a new locally-authored value queued for sync.
    pub fn new(session_id: Uuid, component_id: Uuid, field_key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            site_id: None,
            installation_id: None,
            component_id,
            field_key: field_key.into(),
            value_text: None,
            value_bool: None,
            meta: SyncMeta::local_new(),
        }
    }
}

/// A reusable component configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    /// Stable record id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Equipment category the template applies to.
    pub category: ComponentType,
    /// Default parameters as a JSON document.
    pub default_params_json: Option<String>,
    /// Ordering hint for pickers.
    pub sort_order: i32,
    /// Sync envelope.
    pub meta: SyncMeta,
}

impl_syncable!(ComponentTemplate, EntityKind::ComponentTemplate);

impl ComponentTemplate {
    /// Creates a new locally-authored template queued for sync.
    pub fn new(name: impl Into<String>, category: ComponentType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            default_params_json: None,
            sort_order: 0,
            meta: SyncMeta::local_new(),
        }
    }
}

/// A field definition belonging to a component template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Stable record id.
    pub id: Uuid,
    /// Owning template.
    pub template_id: Uuid,
    /// Machine key referenced by maintenance values.
    pub key: String,
    /// Human-facing label.
    pub label: String,
    /// Value type of the field.
    pub field_type: FieldType,
    /// Display unit for numeric fields.
    pub unit: Option<String>,
    /// Minimum acceptable numeric value.
    pub min_value: Option<f64>,
    /// Maximum acceptable numeric value.
    pub max_value: Option<f64>,
    /// Whether the field describes the component itself rather than a
    /// per-visit measurement.
    pub is_characteristic: bool,
    /// Whether technicians must fill the field in.
    pub required: bool,
    /// Ordering hint within the template.
    pub sort_order: i32,
    /// Sync envelope.
    pub meta: SyncMeta,
}

impl_syncable!(TemplateField, EntityKind::TemplateField);

impl TemplateField {
    /// Creates a new locally-authored field queued for sync.
    pub fn new(
        template_id: Uuid,
        key: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id,
            key: key.into(),
            label: label.into(),
            field_type,
            unit: None,
            min_value: None,
            max_value: None,
            is_characteristic: false,
            required: false,
            sort_order: 0,
            meta: SyncMeta::local_new(),
        }
    }
}

/// Any synchronizable record, tagged with its kind.
///
/// The store and sync engine operate on this type so one code path
/// covers all eight kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// A [`Client`].
    Client(Client),
    /// A [`Site`].
    Site(Site),
    /// An [`Installation`].
    Installation(Installation),
    /// A [`Component`].
    Component(Component),
    /// A [`MaintenanceSession`].
    MaintenanceSession(MaintenanceSession),
    /// A [`MaintenanceValue`].
    MaintenanceValue(MaintenanceValue),
    /// A [`ComponentTemplate`].
    ComponentTemplate(ComponentTemplate),
    /// A [`TemplateField`].
    TemplateField(TemplateField),
}

impl Entity {
    /// The kind of the wrapped record.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Client(_) => EntityKind::Client,
            Entity::Site(_) => EntityKind::Site,
            Entity::Installation(_) => EntityKind::Installation,
            Entity::Component(_) => EntityKind::Component,
            Entity::MaintenanceSession(_) => EntityKind::MaintenanceSession,
            Entity::MaintenanceValue(_) => EntityKind::MaintenanceValue,
            Entity::ComponentTemplate(_) => EntityKind::ComponentTemplate,
            Entity::TemplateField(_) => EntityKind::TemplateField,
        }
    }

    /// The wrapped record's id.
    pub fn id(&self) -> Uuid {
        match self {
            Entity::Client(e) => e.id,
            Entity::Site(e) => e.id,
            Entity::Installation(e) => e.id,
            Entity::Component(e) => e.id,
            Entity::MaintenanceSession(e) => e.id,
            Entity::MaintenanceValue(e) => e.id,
            Entity::ComponentTemplate(e) => e.id,
            Entity::TemplateField(e) => e.id,
        }
    }

    /// The wrapped record's sync envelope.
    pub fn meta(&self) -> &SyncMeta {
        match self {
            Entity::Client(e) => &e.meta,
            Entity::Site(e) => &e.meta,
            Entity::Installation(e) => &e.meta,
            Entity::Component(e) => &e.meta,
            Entity::MaintenanceSession(e) => &e.meta,
            Entity::MaintenanceValue(e) => &e.meta,
            Entity::ComponentTemplate(e) => &e.meta,
            Entity::TemplateField(e) => &e.meta,
        }
    }

    /// The wrapped record's sync envelope, mutable.
    pub fn meta_mut(&mut self) -> &mut SyncMeta {
        match self {
            Entity::Client(e) => &mut e.meta,
            Entity::Site(e) => &mut e.meta,
            Entity::Installation(e) => &mut e.meta,
            Entity::Component(e) => &mut e.meta,
            Entity::MaintenanceSession(e) => &mut e.meta,
            Entity::MaintenanceValue(e) => &mut e.meta,
            Entity::ComponentTemplate(e) => &mut e.meta,
            Entity::TemplateField(e) => &mut e.meta,
        }
    }
}

macro_rules! impl_entity_from {
    ($variant:ident, $ty:ident) => {
        impl From<$ty> for Entity {
            fn from(value: $ty) -> Self {
                Entity::$variant(value)
            }
        }
    };
}

impl_entity_from!(Client, Client);
impl_entity_from!(Site, Site);
impl_entity_from!(Installation, Installation);
impl_entity_from!(Component, Component);
impl_entity_from!(MaintenanceSession, MaintenanceSession);
impl_entity_from!(MaintenanceValue, MaintenanceValue);
impl_entity_from!(ComponentTemplate, ComponentTemplate);
impl_entity_from!(TemplateField, TemplateField);
