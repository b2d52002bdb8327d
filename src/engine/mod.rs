// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command/undo engine.
//!
//! The engine owns the entity store. Each successful command produces a new store revision,
//! records one history entry (the inverse ops) and emits one event. Events go to a single
//! subscriber over an unbounded channel; the subscriber drains it on its own schedule.

use std::sync::Arc;

use log::{debug, warn};
use smol_str::SmolStr;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::config::EditorConfig;
use crate::model::{ApiCallId, ArrowId, ArrowType, EndpointKind, EntityId, EntityStore, EntityType};
use crate::ops::{self, ApplyError, Op, Transaction};

mod command;
mod commands;
mod event;
pub mod fields;
mod history;
pub mod queries;

pub use command::Command;
pub use event::EditorEvent;

use history::{History, HistoryEntry};

pub const INITIAL_HISTORY_LABEL: &str = "(initial)";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("invalid duration '{0}' (expected hh:mm:ss)")]
    InvalidDuration(String),
    #[error("invalid timeout '{0}' (enter a non-negative integer in ms)")]
    InvalidTimeout(String),
    #[error("{source_id} and {target_id} cannot be connected (no shared flow)")]
    Unconnectable {
        source_id: EntityId,
        target_id: EntityId,
    },
    #[error("a node cannot be connected to itself (id={0})")]
    SelfConnection(EntityId),
    #[error("{arrow_type} arrows are not allowed between {kind:?} nodes")]
    ArrowTypeNotAllowed {
        arrow_type: ArrowType,
        kind: EndpointKind,
    },
    #[error("at least two nodes are required to connect (got {0})")]
    NotEnoughNodes(usize),
    #[error("{entity_type} entities cannot be copied")]
    NotCopyable { entity_type: EntityType },
    #[error("copied items must share type and parent")]
    MixedPasteSources,
    #[error("cannot paste {entity_type} into a {target_type}")]
    InvalidPasteTarget {
        entity_type: EntityType,
        target_type: EntityType,
    },
    #[error("{entity_type} is not a hardware component type")]
    NotHwComponent { entity_type: EntityType },
    #[error("entity not found (id={0})")]
    EntityNotFound(EntityId),
    #[error("expected a {expected} but found a {found} (id={entity_id})")]
    WrongType {
        entity_id: EntityId,
        expected: EntityType,
        found: EntityType,
    },
    #[error("{entity_type} entities have no canvas position (id={entity_id})")]
    NotMovable {
        entity_id: EntityId,
        entity_type: EntityType,
    },
    #[error("arrow not found (id={0})")]
    ArrowNotFound(ArrowId),
    #[error("api call not found (id={0})")]
    ApiCallNotFound(ApiCallId),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

impl EditorError {
    /// Validation rejections are expected user mistakes; everything else is a structural fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyName
                | Self::InvalidDuration(_)
                | Self::InvalidTimeout(_)
                | Self::Unconnectable { .. }
                | Self::SelfConnection(_)
                | Self::ArrowTypeNotAllowed { .. }
                | Self::NotEnoughNodes(_)
                | Self::NotCopyable { .. }
                | Self::MixedPasteSources
                | Self::InvalidPasteTarget { .. }
        )
    }
}

pub struct Engine {
    store: Arc<EntityStore>,
    rev: u64,
    history: History,
    config: EditorConfig,
    dirty: bool,
    events: Option<UnboundedSender<EditorEvent>>,
}

impl Engine {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_store(EntityStore::new(), config)
    }

    pub fn with_store(store: EntityStore, config: EditorConfig) -> Self {
        Self {
            store: Arc::new(store),
            rev: 0,
            history: History::new(config.max_undo_size),
            config,
            dirty: false,
            events: None,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// A cheap handle to the current revision; later commands never mutate it.
    pub fn snapshot(&self) -> Arc<EntityStore> {
        Arc::clone(&self.store)
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Opens the event stream. A previous receiver stops receiving events.
    pub fn subscribe(&mut self) -> UnboundedReceiver<EditorEvent> {
        let (sender, receiver) = unbounded_channel();
        self.events = Some(sender);
        receiver
    }

    /// Executes `command` as one undo unit.
    ///
    /// Returns `Ok(None)` when the command is valid but changes nothing (renaming to the same
    /// name, moving nodes to where they already are); nothing is recorded in that case.
    pub fn execute(&mut self, command: Command) -> Result<Option<EditorEvent>, EditorError> {
        let label = command.label();
        let mut tx = Transaction::new(&self.store);
        commands::run(&mut tx, command, &self.config)?;
        if tx.is_empty() {
            debug!("{label}: no changes");
            return Ok(None);
        }

        debug!("{label}: {} op(s)", tx.applied());
        let committed = tx.commit();
        self.advance(committed.store);
        self.history.record(HistoryEntry {
            label,
            ops: committed.inverse,
        });

        let event = EditorEvent::from_changes(committed.events);
        if let Some(event) = &event {
            self.emit(event.clone());
        }
        self.emit_history();
        Ok(event)
    }

    pub fn can_undo(&self) -> bool {
        self.history.undo_len() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history.redo_len() > 0
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.undo_to(1)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.redo_to(1)
    }

    /// Undoes `steps` entries as one revision. A no-op (returning `false`) if fewer exist.
    pub fn undo_to(&mut self, steps: usize) -> Result<bool, EditorError> {
        self.replay(steps, Direction::Undo)
    }

    /// Redoes `steps` entries as one revision. A no-op (returning `false`) if fewer exist.
    pub fn redo_to(&mut self, steps: usize) -> Result<bool, EditorError> {
        self.replay(steps, Direction::Redo)
    }

    fn replay(&mut self, steps: usize, direction: Direction) -> Result<bool, EditorError> {
        let available = match direction {
            Direction::Undo => self.history.undo_len(),
            Direction::Redo => self.history.redo_len(),
        };
        if steps == 0 || steps > available {
            return Ok(false);
        }

        let mut working = (*self.store).clone();
        let mut events = Vec::new();
        let mut replayed: Vec<(HistoryEntry, Vec<Op>)> = Vec::with_capacity(steps);
        for _ in 0..steps {
            let entry = match direction {
                Direction::Undo => self.history.pop_undo(),
                Direction::Redo => self.history.pop_redo(),
            };
            let Some(entry) = entry else {
                break;
            };
            match ops::apply_ops(&mut working, entry.ops.iter().cloned()) {
                Ok((inverse, changes)) => {
                    events.extend(changes);
                    replayed.push((entry, inverse));
                }
                Err(err) => {
                    warn!("{direction:?} of '{}' failed: {err}", entry.label);
                    let restore = std::iter::once(entry)
                        .chain(replayed.into_iter().rev().map(|(entry, _)| entry));
                    for entry in restore {
                        match direction {
                            Direction::Undo => self.history.push_undo(entry),
                            Direction::Redo => self.history.push_redo(entry),
                        }
                    }
                    return Err(err.into());
                }
            }
        }

        for (entry, inverse) in replayed {
            debug!("{direction:?} '{}'", entry.label);
            let flipped = HistoryEntry {
                label: entry.label,
                ops: inverse,
            };
            match direction {
                Direction::Undo => self.history.push_redo(flipped),
                Direction::Redo => self.history.push_undo(flipped),
            }
        }
        self.advance(working);
        if let Some(event) = EditorEvent::from_changes(events) {
            self.emit(event);
        }
        self.emit_history();
        Ok(true)
    }

    pub fn undo_labels(&self) -> Vec<SmolStr> {
        self.history.undo_labels()
    }

    pub fn redo_labels(&self) -> Vec<SmolStr> {
        self.history.redo_labels()
    }

    /// `(initial)`, then undo labels oldest to newest, then redo labels next to last.
    pub fn history_items(&self) -> Vec<SmolStr> {
        let mut items = Vec::with_capacity(1 + self.history.undo_len() + self.history.redo_len());
        items.push(SmolStr::new_static(INITIAL_HISTORY_LABEL));
        items.extend(self.history.undo_labels().into_iter().rev());
        items.extend(self.history.redo_labels());
        items
    }

    /// Index into [`Self::history_items`] of the current state.
    pub fn current_history_index(&self) -> usize {
        self.history.undo_len()
    }

    pub fn jump_to_history(&mut self, index: usize) -> Result<bool, EditorError> {
        let current = self.current_history_index();
        if index < current {
            self.undo_to(current - index)
        } else if index > current {
            self.redo_to(index - current)
        } else {
            Ok(false)
        }
    }

    /// Swaps in a whole new store (load, import, new document). Not undoable; clears history.
    pub fn replace_store(&mut self, store: EntityStore) {
        self.advance(store);
        self.history.clear();
        self.dirty = false;
        self.emit(EditorEvent::StoreRefreshed);
        self.emit_history();
    }

    pub fn resolve_flow_for_connect(&self, source_id: EntityId, target_id: EntityId) -> Option<EntityId> {
        queries::resolve_flow_for_connect(&self.store, source_id, target_id)
    }

    fn advance(&mut self, store: EntityStore) {
        self.store = Arc::new(store);
        self.rev = self.rev.saturating_add(1);
        self.dirty = true;
    }

    fn emit(&mut self, event: EditorEvent) {
        let Some(sender) = &self.events else {
            return;
        };
        if sender.send(event).is_err() {
            debug!("event subscriber dropped; detaching");
            self.events = None;
        }
    }

    fn emit_history(&mut self) {
        self.emit(EditorEvent::HistoryChanged {
            undo_labels: self.history.undo_labels(),
            redo_labels: self.history.redo_labels(),
        });
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("rev", &self.rev)
            .field("entities", &self.store.entity_count())
            .field("arrows", &self.store.arrow_count())
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}
