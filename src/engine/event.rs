// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use crate::model::{ArrowId, EntityId, SelectionKey, Xywh};

/// A completed mutation, as seen by projections.
///
/// Consumers must treat any variant they do not apply incrementally as a request for a full
/// rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditorEvent {
    EntityAdded {
        key: SelectionKey,
        parent_id: Option<EntityId>,
    },
    EntityRemoved {
        key: SelectionKey,
    },
    EntityRenamed {
        key: SelectionKey,
        new_name: SmolStr,
    },
    EntityReparented {
        key: SelectionKey,
        parent_id: EntityId,
    },
    /// `new_pos == None` means the Work went back to its default layout slot.
    WorkMoved {
        id: EntityId,
        new_pos: Option<Xywh>,
    },
    CallMoved {
        id: EntityId,
        new_pos: Option<Xywh>,
    },
    SystemPropsChanged {
        id: EntityId,
    },
    WorkPropsChanged {
        id: EntityId,
    },
    CallPropsChanged {
        id: EntityId,
    },
    ApiDefPropsChanged {
        id: EntityId,
    },
    ArrowAdded {
        arrow_id: ArrowId,
        flow_id: EntityId,
    },
    ArrowRemoved {
        arrow_id: ArrowId,
    },
    ArrowUpdated {
        arrow_id: ArrowId,
    },
    HistoryChanged {
        undo_labels: Vec<SmolStr>,
        redo_labels: Vec<SmolStr>,
    },
    StoreRefreshed,
    Batch(Vec<EditorEvent>),
}

impl EditorEvent {
    /// Folds the per-op events of one command into a single event.
    pub fn from_changes(mut changes: Vec<EditorEvent>) -> Option<Self> {
        match changes.len() {
            0 => None,
            1 => changes.pop(),
            _ => Some(Self::Batch(changes)),
        }
    }

    /// Depth-first iteration over non-batch events.
    pub fn leaves(&self) -> Vec<&EditorEvent> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(event) = stack.pop() {
            match event {
                Self::Batch(events) => stack.extend(events.iter().rev()),
                other => out.push(other),
            }
        }
        out
    }
}
