// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::EntityType;
use super::ids::{ArrowId, EntityId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowType {
    None,
    #[default]
    Start,
    Reset,
    StartReset,
    ResetReset,
    Group,
}

impl ArrowType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Start => "Start",
            Self::Reset => "Reset",
            Self::StartReset => "StartReset",
            Self::ResetReset => "ResetReset",
            Self::Group => "Group",
        }
    }

    /// Kinds offered when connecting nodes of the given endpoint kind.
    pub fn choices_for(kind: EndpointKind) -> &'static [ArrowType] {
        match kind {
            EndpointKind::Work => &[Self::Start, Self::Reset, Self::StartReset, Self::ResetReset],
            EndpointKind::Call => &[Self::Start, Self::Group],
        }
    }

    pub fn is_allowed_for(self, kind: EndpointKind) -> bool {
        Self::choices_for(kind).contains(&self)
    }
}

impl fmt::Display for ArrowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an arrow connects two Works or two Calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    Work,
    Call,
}

impl EndpointKind {
    pub fn of(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Work => Some(Self::Work),
            EntityType::Call => Some(Self::Call),
            _ => None,
        }
    }

    pub fn entity_type(self) -> EntityType {
        match self {
            Self::Work => EntityType::Work,
            Self::Call => EntityType::Call,
        }
    }
}

/// A directed, typed edge between two Works or two Calls of one flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrow {
    id: ArrowId,
    source_id: EntityId,
    target_id: EntityId,
    arrow_type: ArrowType,
    flow_id: EntityId,
    endpoint_kind: EndpointKind,
}

impl Arrow {
    pub fn new(
        id: ArrowId,
        source_id: EntityId,
        target_id: EntityId,
        arrow_type: ArrowType,
        flow_id: EntityId,
        endpoint_kind: EndpointKind,
    ) -> Self {
        Self {
            id,
            source_id,
            target_id,
            arrow_type,
            flow_id,
            endpoint_kind,
        }
    }

    pub fn id(&self) -> ArrowId {
        self.id
    }

    pub fn source_id(&self) -> EntityId {
        self.source_id
    }

    pub fn target_id(&self) -> EntityId {
        self.target_id
    }

    pub fn arrow_type(&self) -> ArrowType {
        self.arrow_type
    }

    pub fn flow_id(&self) -> EntityId {
        self.flow_id
    }

    pub fn endpoint_kind(&self) -> EndpointKind {
        self.endpoint_kind
    }

    pub fn touches(&self, entity_id: EntityId) -> bool {
        self.source_id == entity_id || self.target_id == entity_id
    }

    pub fn with_endpoint(&self, replace_source: bool, endpoint_id: EntityId, flow_id: EntityId) -> Self {
        let mut next = self.clone();
        if replace_source {
            next.source_id = endpoint_id;
        } else {
            next.target_id = endpoint_id;
        }
        next.flow_id = flow_id;
        next
    }
}
