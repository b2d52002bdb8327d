// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Primitive, invertible mutations of an [`EntityStore`].
//!
//! Every op validates the structure it touches, mutates the store and returns its exact inverse
//! together with the typed events describing what changed. Commands in the engine are built from
//! sequences of these ops; undo is the replay of the collected inverses.

use smallvec::SmallVec;

use crate::engine::EditorEvent;
use crate::model::{Arrow, ArrowId, Entity, EntityId, EntityStore, EntityType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    InsertEntity {
        entity: Entity,
        index: Option<usize>,
    },
    RemoveEntity {
        entity_id: EntityId,
    },
    /// Replaces name and props of an existing entity. Type and parent must not change.
    UpdateEntity {
        entity: Entity,
    },
    Reparent {
        entity_id: EntityId,
        parent_id: EntityId,
        index: Option<usize>,
    },
    InsertArrow {
        arrow: Arrow,
        index: Option<usize>,
    },
    RemoveArrow {
        arrow_id: ArrowId,
    },
    UpdateArrow {
        arrow: Arrow,
    },
}

pub type OpEvents = SmallVec<[EditorEvent; 2]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub inverse: Op,
    pub events: OpEvents,
}

/// The outcome of a committed [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub store: EntityStore,
    /// Ops that revert the transaction, in the order they must be applied.
    pub inverse: Vec<Op>,
    pub events: Vec<EditorEvent>,
}

/// Ops applied to a private copy of a store revision.
///
/// Dropping a transaction without committing discards every applied op, so a command that fails
/// halfway leaves the base revision untouched.
#[derive(Debug, Clone)]
pub struct Transaction {
    store: EntityStore,
    inverse: Vec<Op>,
    events: Vec<EditorEvent>,
}

impl Transaction {
    pub fn new(base: &EntityStore) -> Self {
        Self {
            store: base.clone(),
            inverse: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn apply(&mut self, op: Op) -> Result<(), ApplyError> {
        let applied = apply_op(&mut self.store, op)?;
        self.inverse.push(applied.inverse);
        self.events.extend(applied.events);
        Ok(())
    }

    pub fn applied(&self) -> usize {
        self.inverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverse.is_empty()
    }

    pub fn commit(self) -> Committed {
        let mut inverse = self.inverse;
        inverse.reverse();
        Committed {
            store: self.store,
            inverse,
            events: self.events,
        }
    }
}

/// Applies `ops` atomically: either all of them are applied or `store` is left untouched.
pub fn apply_ops(
    store: &mut EntityStore,
    ops: impl IntoIterator<Item = Op>,
) -> Result<(Vec<Op>, Vec<EditorEvent>), ApplyError> {
    let mut tx = Transaction::new(store);
    for op in ops {
        tx.apply(op)?;
    }
    let committed = tx.commit();
    *store = committed.store;
    Ok((committed.inverse, committed.events))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("entity already exists (id={entity_id})")]
    EntityExists { entity_id: EntityId },
    #[error("entity not found (id={entity_id})")]
    EntityNotFound { entity_id: EntityId },
    #[error("{entity_type} entities are not stored")]
    NotStorable { entity_type: EntityType },
    #[error("parent not found (id={parent_id})")]
    ParentNotFound { parent_id: EntityId },
    #[error("a {entity_type} cannot be placed under {}", parent_label(.parent_type))]
    InvalidParent {
        entity_type: EntityType,
        parent_type: Option<EntityType>,
    },
    #[error("entity still has children (id={entity_id})")]
    HasChildren { entity_id: EntityId },
    #[error("entity is still referenced by arrows (id={entity_id})")]
    ArrowsAttached { entity_id: EntityId },
    #[error("entity type or parent cannot change in an update (id={entity_id})")]
    IdentityChanged { entity_id: EntityId },
    #[error("props do not match the entity type (id={entity_id})")]
    PropsMismatch { entity_id: EntityId },
    #[error("moving {entity_id} under {parent_id} would create a cycle")]
    Cycle {
        entity_id: EntityId,
        parent_id: EntityId,
    },
    #[error("arrow already exists (id={arrow_id})")]
    ArrowExists { arrow_id: ArrowId },
    #[error("arrow not found (id={arrow_id})")]
    ArrowNotFound { arrow_id: ArrowId },
    #[error("arrow endpoint is missing or of the wrong type (arrow={arrow_id}, entity={entity_id})")]
    InvalidEndpoint {
        arrow_id: ArrowId,
        entity_id: EntityId,
    },
    #[error("arrow flow is not a flow (arrow={arrow_id}, flow={flow_id})")]
    InvalidArrowFlow { arrow_id: ArrowId, flow_id: EntityId },
}

fn parent_label(parent_type: &Option<EntityType>) -> String {
    match parent_type {
        Some(parent_type) => format!("a {parent_type}"),
        None => "the root".to_owned(),
    }
}

// Per-op validation and event derivation.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;
