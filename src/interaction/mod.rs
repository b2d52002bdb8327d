// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas interaction state machine.
//!
//! Consumes toolkit-neutral pointer and key events, drives selection, and turns completed
//! gestures into engine commands through an [`InteractionHost`]. Exactly one
//! [`InteractionState`] is active at a time.

use glam::DVec2;
use log::debug;

use crate::config::EditorConfig;
use crate::engine::Command;
use crate::geometry::Rect;
use crate::model::{ArrowId, ArrowType, EndpointKind, EntityId, EntityType, SelectionKey, Xywh};
use crate::projection::CanvasProjection;
use crate::selection::{canvas_order, Modifiers, SelectionCandidate, SelectionEngine};

mod hit;
mod prompt;
mod viewport;

pub use hit::{hit_test, Hit};
pub use prompt::{ArrowTypeMemory, ArrowTypePrompt, FixedArrowType};
pub use viewport::Viewport;

/// What the state machine needs from its owner.
pub trait InteractionHost {
    fn config(&self) -> &EditorConfig;
    fn canvas(&self) -> &CanvasProjection;
    fn selection(&self) -> &SelectionEngine;
    fn selection_mut(&mut self) -> &mut SelectionEngine;
    /// Runs `command` at the engine boundary. Failures are reported by the host; the return
    /// value only says whether the command was applied.
    fn execute(&mut self, command: Command) -> bool;
    fn resolve_flow_for_connect(&self, source_id: EntityId, target_id: EntityId) -> Option<EntityId>;
    fn open_canvas_tab(&mut self, entity_id: EntityId);
    /// Live drag feedback. Nothing is committed.
    fn preview_node(&mut self, entity_id: EntityId, origin: DVec2);
    /// The selection changed; views should refresh their flags.
    fn selection_changed(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Other,
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: DVec2,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub click_count: u8,
}

impl PointerEvent {
    pub fn new(position: DVec2, button: PointerButton) -> Self {
        Self {
            position,
            button,
            modifiers: Modifiers::NONE,
            click_count: 1,
        }
    }

    pub fn left(x: f64, y: f64) -> Self {
        Self::new(DVec2::new(x, y), PointerButton::Left)
    }

    pub fn middle(x: f64, y: f64) -> Self {
        Self::new(DVec2::new(x, y), PointerButton::Middle)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn double(mut self) -> Self {
        self.click_count = 2;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragItem {
    pub entity_id: EntityId,
    pub origin: DVec2,
    pub current: DVec2,
    pub size: DVec2,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        last: DVec2,
    },
    BoxSelecting {
        start: DVec2,
        current: DVec2,
        additive: bool,
    },
    Dragging {
        start: DVec2,
        items: Vec<DragItem>,
    },
    Connecting {
        source_id: EntityId,
        kind: EndpointKind,
        arrow_type: ArrowType,
        anchor: DVec2,
        pointer: DVec2,
    },
    ArrowReconnecting {
        arrow_id: ArrowId,
        replace_source: bool,
        /// The endpoint that stays put.
        anchor: DVec2,
        pointer: DVec2,
    },
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Panning { .. } => "Panning",
            Self::BoxSelecting { .. } => "BoxSelecting",
            Self::Dragging { .. } => "Dragging",
            Self::Connecting { .. } => "Connecting",
            Self::ArrowReconnecting { .. } => "ArrowReconnecting",
        }
    }
}

/// Result of the toolbar "connect" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStart {
    /// The ordered selection was chained right away.
    ConnectedInOrder,
    /// Waiting for the user to click the target node.
    Pending,
    /// The user cancelled the arrow type prompt.
    Cancelled,
    /// Nothing connectable is selected.
    NothingToConnect,
}

#[derive(Debug, Clone, Default)]
pub struct CanvasInteraction {
    state: InteractionState,
    viewport: Viewport,
    arrow_types: ArrowTypeMemory,
}

impl CanvasInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn arrow_types(&self) -> &ArrowTypeMemory {
        &self.arrow_types
    }

    /// The live connect/reconnect segment, in canvas coordinates.
    pub fn preview_line(&self) -> Option<(DVec2, DVec2)> {
        match self.state {
            InteractionState::Connecting { anchor, pointer, .. }
            | InteractionState::ArrowReconnecting { anchor, pointer, .. } => Some((anchor, pointer)),
            _ => None,
        }
    }

    /// The rubber band, in canvas coordinates.
    pub fn selection_rect(&self) -> Option<Rect> {
        match self.state {
            InteractionState::BoxSelecting { start, current, .. } => {
                Some(Rect::from_corners(start, current))
            }
            _ => None,
        }
    }

    /// Drops any gesture in progress without side effects.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn pointer_down(&mut self, host: &mut dyn InteractionHost, event: PointerEvent) -> bool {
        match event.button {
            PointerButton::Middle if self.is_idle() => {
                self.state = InteractionState::Panning {
                    last: event.position,
                };
                true
            }
            PointerButton::Left => self.left_down(host, event),
            _ => false,
        }
    }

    fn left_down(&mut self, host: &mut dyn InteractionHost, event: PointerEvent) -> bool {
        if !matches!(
            self.state,
            InteractionState::Idle | InteractionState::Connecting { .. }
        ) {
            return false;
        }
        let point = self.viewport.screen_to_canvas(event.position);
        let hit = hit_test(host.canvas(), host.selection(), point, host.config());

        match hit {
            Hit::Handle {
                arrow_id,
                replace_source,
            } => self.begin_reconnect(host, arrow_id, replace_source, point),
            Hit::Node(key) => {
                if let InteractionState::Connecting { source_id, .. } = self.state {
                    if source_id != key.id {
                        self.complete_connect(host, key.id);
                    }
                    return true;
                }
                if event.click_count >= 2 && key.entity_type == EntityType::Work {
                    host.open_canvas_tab(key.id);
                    return true;
                }
                self.press_node(host, key, event.modifiers, point);
                true
            }
            Hit::Arrow(arrow_id) => {
                if self.cancel_connect() {
                    return true;
                }
                host.selection_mut().select_arrow(arrow_id, event.modifiers.ctrl);
                host.selection_changed();
                true
            }
            Hit::Empty => {
                if self.cancel_connect() {
                    return true;
                }
                host.selection_mut().clear_arrows();
                host.selection_changed();
                self.state = InteractionState::BoxSelecting {
                    start: point,
                    current: point,
                    additive: event.modifiers.ctrl,
                };
                true
            }
        }
    }

    /// Updates the selection for a node press and starts a drag for unmodified presses.
    fn press_node(&mut self, host: &mut dyn InteractionHost, key: SelectionKey, modifiers: Modifiers, point: DVec2) {
        let keep_current = !modifiers.any()
            && host.selection().is_selected(key)
            && host.selection().nodes().len() > 1;
        if !keep_current {
            let order = canvas_order(&candidates(host.canvas()));
            host.selection_mut().click(Some(key), modifiers, &order);
        }
        host.selection_mut().clear_arrows();
        host.selection_changed();
        if modifiers.any() {
            return;
        }

        let canvas = host.canvas();
        let selection = host.selection();
        let mut items = canvas
            .nodes()
            .iter()
            .filter(|node| selection.is_selected(node.key) && node.key.entity_type.is_work_or_call())
            .map(drag_item)
            .collect::<Vec<_>>();
        if !items.iter().any(|item| item.entity_id == key.id) {
            items = canvas.node(key.id).map(drag_item).into_iter().collect();
        }
        debug!("drag start: {} node(s)", items.len());
        self.state = InteractionState::Dragging {
            start: point,
            items,
        };
    }

    fn begin_reconnect(
        &mut self,
        host: &mut dyn InteractionHost,
        arrow_id: ArrowId,
        replace_source: bool,
        point: DVec2,
    ) -> bool {
        self.cancel_connect();
        let Some(arrow) = host.canvas().arrow(arrow_id) else {
            return false;
        };
        let anchor = if replace_source {
            arrow.path.end()
        } else {
            arrow.path.start()
        };
        let Some(anchor) = anchor else {
            return false;
        };
        self.state = InteractionState::ArrowReconnecting {
            arrow_id,
            replace_source,
            anchor,
            pointer: point,
        };
        true
    }

    pub fn pointer_move(&mut self, host: &mut dyn InteractionHost, screen: DVec2) {
        let point = self.viewport.screen_to_canvas(screen);
        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::Panning { last } => {
                let delta = screen - *last;
                *last = screen;
                self.viewport.pan_by(delta);
            }
            InteractionState::BoxSelecting { current, .. } => *current = point,
            InteractionState::Connecting { pointer, .. }
            | InteractionState::ArrowReconnecting { pointer, .. } => *pointer = point,
            InteractionState::Dragging { start, items } => {
                let delta = point - *start;
                for item in items.iter_mut() {
                    item.current = (item.origin + delta).max(DVec2::ZERO);
                    host.preview_node(item.entity_id, item.current);
                }
            }
        }
    }

    pub fn pointer_up(&mut self, host: &mut dyn InteractionHost, event: PointerEvent) -> bool {
        let point = self.viewport.screen_to_canvas(event.position);
        match (event.button, std::mem::take(&mut self.state)) {
            (PointerButton::Middle, InteractionState::Panning { .. }) => true,
            (PointerButton::Left, InteractionState::BoxSelecting { start, additive, .. }) => {
                let rect = Rect::from_corners(start, point);
                let threshold = host.config().click_threshold;
                let candidates = candidates(host.canvas());
                host.selection_mut()
                    .select_box(rect, &candidates, additive, threshold);
                host.selection_changed();
                true
            }
            (
                PointerButton::Left,
                InteractionState::ArrowReconnecting {
                    arrow_id,
                    replace_source,
                    ..
                },
            ) => {
                let target = host.canvas().node_at(point).map(|node| node.id());
                if let Some(new_endpoint_id) = target {
                    host.execute(Command::ReconnectArrow {
                        arrow_id,
                        replace_source,
                        new_endpoint_id,
                    });
                }
                true
            }
            (PointerButton::Left, InteractionState::Dragging { items, .. }) => {
                self.finish_drag(host, &items);
                true
            }
            (_, state) => {
                self.state = state;
                false
            }
        }
    }

    fn finish_drag(&mut self, host: &mut dyn InteractionHost, items: &[DragItem]) {
        let epsilon = host.config().drag_epsilon;
        let mut moves = Vec::new();
        let mut moved = Vec::new();
        for item in items {
            let delta = (item.current - item.origin).abs();
            let target = stored_rect(item.current, item.size);
            // Sub-unit drags truncate back onto the stored rect and must not count as moves.
            let past_epsilon = delta.x > epsilon || delta.y > epsilon;
            if past_epsilon && target != stored_rect(item.origin, item.size) {
                moves.push((item.entity_id, Some(target)));
                moved.push(item);
            } else if item.current != item.origin {
                host.preview_node(item.entity_id, item.origin);
            }
        }

        if moves.is_empty() {
            return;
        }
        if !host.execute(Command::MoveEntities { moves }) {
            for item in moved {
                host.preview_node(item.entity_id, item.origin);
            }
        }
    }

    pub fn key_down(&mut self, host: &mut dyn InteractionHost, key: Key) -> bool {
        match key {
            Key::Escape => match self.state {
                InteractionState::Connecting { .. } | InteractionState::ArrowReconnecting { .. } => {
                    self.state = InteractionState::Idle;
                    true
                }
                _ => false,
            },
            Key::Delete => delete_selection(host),
            Key::Other => false,
        }
    }

    /// Mouse wheel: one zoom step around the pointer.
    pub fn wheel(&mut self, config: &EditorConfig, screen: DVec2, zoom_in: bool) -> bool {
        self.viewport.wheel(screen, zoom_in, config)
    }

    /// Fits every canvas node into a `view`-sized area.
    pub fn fit_to_view(&mut self, canvas: &CanvasProjection, view: DVec2, config: &EditorConfig) -> bool {
        match canvas.bounds() {
            Some(bounds) => self.viewport.fit(bounds, view, config),
            None => false,
        }
    }

    /// Toolbar connect action.
    ///
    /// With two or more ordered Work/Call nodes selected, chains them in selection order.
    /// Otherwise the primary selected node becomes the source of a pending connection.
    pub fn start_connect(
        &mut self,
        host: &mut dyn InteractionHost,
        prompt: &mut dyn ArrowTypePrompt,
    ) -> ConnectStart {
        if !self.is_idle() {
            self.cancel_connect();
        }
        let selected = host.selection().nodes().to_vec();
        let ordered_kind = if selected.len() >= 2 {
            selected
                .iter()
                .find_map(|key| EndpointKind::of(key.entity_type))
        } else {
            None
        };

        let mut prompted = None;
        if let Some(kind) = ordered_kind {
            let Some(arrow_type) = self.arrow_types.prompt(prompt, kind) else {
                return ConnectStart::Cancelled;
            };
            prompted = Some((kind, arrow_type));
            let ordered = selected.iter().map(|key| key.id).collect();
            if host.execute(Command::ConnectInOrder {
                ordered,
                arrow_type,
            }) {
                return ConnectStart::ConnectedInOrder;
            }
        }

        let Some(primary) = host.selection().primary() else {
            return ConnectStart::NothingToConnect;
        };
        let Some(kind) = EndpointKind::of(primary.entity_type) else {
            return ConnectStart::NothingToConnect;
        };
        let Some(anchor) = host.canvas().node(primary.id).map(|node| node.rect.center()) else {
            return ConnectStart::NothingToConnect;
        };
        let arrow_type = match prompted {
            Some((prompted_kind, arrow_type)) if prompted_kind == kind => arrow_type,
            _ => match self.arrow_types.prompt(prompt, kind) {
                Some(arrow_type) => arrow_type,
                None => return ConnectStart::Cancelled,
            },
        };

        debug!("connect pending from {primary} as {arrow_type}");
        self.state = InteractionState::Connecting {
            source_id: primary.id,
            kind,
            arrow_type,
            anchor,
            pointer: anchor,
        };
        ConnectStart::Pending
    }

    fn complete_connect(&mut self, host: &mut dyn InteractionHost, target_id: EntityId) {
        let InteractionState::Connecting {
            source_id,
            arrow_type,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return;
        };
        if host.canvas().node(source_id).is_none() || host.canvas().node(target_id).is_none() {
            debug!("connect cancelled: endpoint left the canvas");
            return;
        }
        if host.resolve_flow_for_connect(source_id, target_id).is_none() {
            debug!("connect cancelled: no shared flow");
            return;
        }
        host.execute(Command::AddArrow {
            source_id,
            target_id,
            arrow_type,
        });
    }

    /// Cancels a pending connection. Returns whether one was pending.
    pub fn cancel_connect(&mut self) -> bool {
        if matches!(self.state, InteractionState::Connecting { .. }) {
            self.state = InteractionState::Idle;
            return true;
        }
        false
    }
}

/// The integer rect a node at `origin` is stored with.
fn stored_rect(origin: DVec2, size: DVec2) -> Xywh {
    Xywh::new(origin.x as i32, origin.y as i32, size.x as i32, size.y as i32)
}

/// Delete key: selected arrows first, then the selected nodes, as one undo unit each.
pub fn delete_selection(host: &mut dyn InteractionHost) -> bool {
    let arrows = host.selection().arrows().to_vec();
    if !arrows.is_empty() {
        let removed = host.execute(Command::RemoveArrows { ids: arrows });
        host.selection_mut().clear_arrows();
        host.selection_changed();
        return removed;
    }

    let ids = host
        .selection()
        .nodes()
        .iter()
        .filter(|key| key.entity_type.is_stored())
        .map(|key| key.id)
        .collect::<Vec<_>>();
    if ids.is_empty() {
        return false;
    }
    host.execute(Command::RemoveEntities { ids })
}

fn candidates(canvas: &CanvasProjection) -> Vec<SelectionCandidate> {
    canvas
        .nodes()
        .iter()
        .map(|node| SelectionCandidate {
            key: node.key,
            rect: node.rect,
        })
        .collect()
}

fn drag_item(node: &crate::projection::CanvasNode) -> DragItem {
    DragItem {
        entity_id: node.id(),
        origin: node.rect.min,
        current: node.rect.min,
        size: node.rect.max - node.rect.min,
    }
}
