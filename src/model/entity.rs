// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::ids::{ApiCallId, EntityId};

/// The kind of an entity.
///
/// `ApiDefCategory` and `DeviceRoot` only exist in tree projections; the store never holds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Project,
    System,
    Flow,
    Work,
    Call,
    ApiDef,
    Button,
    Lamp,
    Condition,
    Action,
    ApiDefCategory,
    DeviceRoot,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::System => "System",
            Self::Flow => "Flow",
            Self::Work => "Work",
            Self::Call => "Call",
            Self::ApiDef => "ApiDef",
            Self::Button => "Button",
            Self::Lamp => "Lamp",
            Self::Condition => "Condition",
            Self::Action => "Action",
            Self::ApiDefCategory => "ApiDefCategory",
            Self::DeviceRoot => "DeviceRoot",
        }
    }

    pub fn is_work_or_call(self) -> bool {
        matches!(self, Self::Work | Self::Call)
    }

    pub fn is_canvas_openable(self) -> bool {
        matches!(self, Self::System | Self::Flow | Self::Work)
    }

    pub fn is_copyable(self) -> bool {
        matches!(self, Self::Flow | Self::Work | Self::Call)
    }

    pub fn is_hw_component(self) -> bool {
        matches!(self, Self::Button | Self::Lamp | Self::Condition | Self::Action)
    }

    pub fn is_stored(self) -> bool {
        !matches!(self, Self::ApiDefCategory | Self::DeviceRoot)
    }

    /// The only entity type allowed as the parent of `self`, or `None` for roots.
    pub fn parent_type(self) -> Option<EntityType> {
        match self {
            Self::Project | Self::ApiDefCategory | Self::DeviceRoot => None,
            Self::System => Some(Self::Project),
            Self::Flow
            | Self::ApiDef
            | Self::Button
            | Self::Lamp
            | Self::Condition
            | Self::Action => Some(Self::System),
            Self::Work => Some(Self::Flow),
            Self::Call => Some(Self::Work),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-qualified identity used by selections and projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectionKey {
    pub id: EntityId,
    pub entity_type: EntityType,
}

impl SelectionKey {
    pub fn new(id: EntityId, entity_type: EntityType) -> Self {
        Self { id, entity_type }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

/// Persisted integer canvas geometry of a Work or Call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Xywh {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Xywh {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkProps {
    pub position: Option<Xywh>,
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCall {
    pub id: ApiCallId,
    pub name: SmolStr,
    pub api_def_id: Option<EntityId>,
    pub output_address: String,
    pub input_address: String,
    pub value_spec: String,
    pub input_value_spec: String,
}

impl ApiCall {
    pub fn new(name: impl Into<SmolStr>, api_def_id: Option<EntityId>) -> Self {
        Self {
            id: ApiCallId::new(),
            name: name.into(),
            api_def_id,
            output_address: String::new(),
            input_address: String::new(),
            value_spec: String::new(),
            input_value_spec: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallProps {
    pub position: Option<Xywh>,
    pub timeout_ms: Option<u32>,
    pub api_calls: Vec<ApiCall>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDefProps {
    pub is_push: bool,
    pub tx_work: Option<EntityId>,
    pub rx_work: Option<EntityId>,
    pub duration_ms: u32,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityProps {
    Plain,
    System { is_active: bool },
    Work(WorkProps),
    Call(CallProps),
    ApiDef(ApiDefProps),
}

impl EntityProps {
    pub fn default_for(entity_type: EntityType) -> Self {
        match entity_type {
            EntityType::System => Self::System { is_active: true },
            EntityType::Work => Self::Work(WorkProps::default()),
            EntityType::Call => Self::Call(CallProps::default()),
            EntityType::ApiDef => Self::ApiDef(ApiDefProps::default()),
            _ => Self::Plain,
        }
    }

    fn fits(&self, entity_type: EntityType) -> bool {
        matches!(
            (self, entity_type),
            (Self::System { .. }, EntityType::System)
                | (Self::Work(_), EntityType::Work)
                | (Self::Call(_), EntityType::Call)
                | (Self::ApiDef(_), EntityType::ApiDef)
        ) || (matches!(self, Self::Plain)
            && !matches!(
                entity_type,
                EntityType::System | EntityType::Work | EntityType::Call | EntityType::ApiDef
            ))
    }
}

/// A node of the process graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    entity_type: EntityType,
    name: SmolStr,
    parent_id: Option<EntityId>,
    props: EntityProps,
}

impl Entity {
    pub fn new(entity_type: EntityType, name: impl Into<SmolStr>, parent_id: Option<EntityId>) -> Self {
        Self::with_id(EntityId::new(), entity_type, name, parent_id)
    }

    pub fn with_id(
        id: EntityId,
        entity_type: EntityType,
        name: impl Into<SmolStr>,
        parent_id: Option<EntityId>,
    ) -> Self {
        Self {
            id,
            entity_type,
            name: name.into(),
            parent_id,
            props: EntityProps::default_for(entity_type),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn key(&self) -> SelectionKey {
        SelectionKey::new(self.id, self.entity_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn parent_id(&self) -> Option<EntityId> {
        self.parent_id
    }

    pub fn set_parent_id(&mut self, parent_id: Option<EntityId>) {
        self.parent_id = parent_id;
    }

    pub fn props(&self) -> &EntityProps {
        &self.props
    }

    /// Replaces the props. Returns `false` (and changes nothing) if they belong to another type.
    pub fn set_props(&mut self, props: EntityProps) -> bool {
        if !props.fits(self.entity_type) {
            return false;
        }
        self.props = props;
        true
    }

    pub(crate) fn props_mut(&mut self) -> &mut EntityProps {
        &mut self.props
    }

    /// Canvas geometry for Work/Call nodes; `None` both for "unplaced" and for other types.
    pub fn position(&self) -> Option<Xywh> {
        match &self.props {
            EntityProps::Work(work) => work.position,
            EntityProps::Call(call) => call.position,
            _ => None,
        }
    }

    pub fn set_position(&mut self, position: Option<Xywh>) -> bool {
        match &mut self.props {
            EntityProps::Work(work) => work.position = position,
            EntityProps::Call(call) => call.position = position,
            _ => return false,
        }
        true
    }

    pub fn is_active_system(&self) -> bool {
        matches!(self.props, EntityProps::System { is_active: true })
    }

    pub fn work_props(&self) -> Option<&WorkProps> {
        match &self.props {
            EntityProps::Work(work) => Some(work),
            _ => None,
        }
    }

    pub fn call_props(&self) -> Option<&CallProps> {
        match &self.props {
            EntityProps::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn api_def_props(&self) -> Option<&ApiDefProps> {
        match &self.props {
            EntityProps::ApiDef(api_def) => Some(api_def),
            _ => None,
        }
    }
}
