// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only views derived from a store revision.
//!
//! Projections never mutate the store. They are rebuilt (or patched in place for renames and
//! moves) in response to engine events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{EntityId, EntityType};

mod canvas;
mod search;
mod tree;

pub use canvas::{default_slot, CanvasArrow, CanvasNode, CanvasProjection};
pub use search::{fuzzy_score, search_tree, SearchHit};
pub use tree::{TreeNode, TreePane, TreeProjection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TabKind {
    System,
    Flow,
    Work,
}

impl TabKind {
    pub fn for_entity_type(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::System => Some(Self::System),
            EntityType::Flow => Some(Self::Flow),
            EntityType::Work => Some(Self::Work),
            _ => None,
        }
    }

    pub fn entity_type(self) -> EntityType {
        match self {
            Self::System => EntityType::System,
            Self::Flow => EntityType::Flow,
            Self::Work => EntityType::Work,
        }
    }
}

impl fmt::Display for TabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.entity_type(), f)
    }
}

/// An open canvas. Unique per `(kind, root_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasTab {
    pub root_id: EntityId,
    pub kind: TabKind,
    pub title: String,
}

impl CanvasTab {
    pub fn new(kind: TabKind, root_id: EntityId, title: impl Into<String>) -> Self {
        Self {
            root_id,
            kind,
            title: title.into(),
        }
    }

    pub fn key(&self) -> (TabKind, EntityId) {
        (self.kind, self.root_id)
    }
}
