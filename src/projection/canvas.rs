// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, HashSet};

use smol_str::SmolStr;

use super::TabKind;
use crate::config::EditorConfig;
use crate::engine::queries::works_for_system;
use crate::geometry::{arrow_path, ArrowPath, Rect};
use crate::model::{
    Arrow, ArrowId, ArrowType, EndpointKind, Entity, EntityId, EntityStore, EntityType,
    SelectionKey, Xywh,
};

/// Layout rectangle for a node without a stored position: a grid cell by canvas index.
pub fn default_slot(index: usize, config: &EditorConfig) -> Xywh {
    let columns = config.default_slot_columns.max(1);
    let col = i32::try_from(index % columns).unwrap_or(i32::MAX);
    let row = i32::try_from(index / columns).unwrap_or(i32::MAX);
    let w = config.default_node_width;
    let h = config.default_node_height;
    Xywh::new(
        config
            .default_node_x
            .saturating_add(col.saturating_mul(w + config.default_slot_gap)),
        config
            .default_node_y
            .saturating_add(row.saturating_mul(h + config.default_slot_gap)),
        w,
        h,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasNode {
    pub key: SelectionKey,
    pub name: SmolStr,
    pub parent_id: Option<EntityId>,
    pub rect: Rect,
    /// `false` when the node sits in its default slot.
    pub placed: bool,
    /// 1-based position in the ordered selection, `0` when not selected.
    pub selection_order: usize,
}

impl CanvasNode {
    pub fn id(&self) -> EntityId {
        self.key.id
    }

    pub fn is_selected(&self) -> bool {
        self.selection_order > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasArrow {
    pub id: ArrowId,
    pub source_id: EntityId,
    pub target_id: EntityId,
    pub arrow_type: ArrowType,
    pub flow_id: EntityId,
    pub path: ArrowPath,
    pub selected: bool,
}

/// Flat node and arrow lists for one canvas tab, with resolved arrow geometry.
#[derive(Debug, Clone, Default)]
pub struct CanvasProjection {
    tab: Option<(TabKind, EntityId)>,
    nodes: Vec<CanvasNode>,
    arrows: Vec<CanvasArrow>,
}

impl CanvasProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(store: &EntityStore, tab: Option<(TabKind, EntityId)>, config: &EditorConfig) -> Self {
        let mut canvas = Self::new();
        canvas.rebuild(store, tab, config);
        canvas
    }

    pub fn rebuild(&mut self, store: &EntityStore, tab: Option<(TabKind, EntityId)>, config: &EditorConfig) {
        self.tab = tab;
        self.nodes.clear();
        self.arrows.clear();
        let Some((kind, root_id)) = tab else {
            return;
        };
        if store.entity_of_type(root_id, kind.entity_type()).is_none() {
            return;
        }

        let members: Vec<&Entity> = match kind {
            TabKind::System => works_for_system(store, root_id),
            TabKind::Flow => store.children_of_type(root_id, EntityType::Work).collect(),
            TabKind::Work => store.children_of_type(root_id, EntityType::Call).collect(),
        };
        self.nodes = members
            .into_iter()
            .enumerate()
            .map(|(index, entity)| {
                let placed = entity.position().is_some();
                let xywh = entity.position().unwrap_or_else(|| default_slot(index, config));
                CanvasNode {
                    key: entity.key(),
                    name: entity.name().into(),
                    parent_id: entity.parent_id(),
                    rect: xywh.into(),
                    placed,
                    selection_order: 0,
                }
            })
            .collect();

        let flows = flow_ids_for_tab(store, kind, root_id)
            .into_iter()
            .collect::<HashSet<_>>();
        let kind_filter = match kind {
            TabKind::System | TabKind::Flow => EndpointKind::Work,
            TabKind::Work => EndpointKind::Call,
        };
        let on_canvas = self.nodes.iter().map(CanvasNode::id).collect::<HashSet<_>>();
        let arrows = store
            .arrows()
            .filter(|arrow| arrow.endpoint_kind() == kind_filter && flows.contains(&arrow.flow_id()))
            .filter(|arrow| on_canvas.contains(&arrow.source_id()) && on_canvas.contains(&arrow.target_id()))
            .cloned()
            .collect::<Vec<_>>();
        self.arrows = arrows
            .iter()
            .filter_map(|arrow| self.canvas_arrow(arrow, config))
            .collect();
    }

    fn canvas_arrow(&self, arrow: &Arrow, config: &EditorConfig) -> Option<CanvasArrow> {
        let source = self.node(arrow.source_id())?;
        let target = self.node(arrow.target_id())?;
        Some(CanvasArrow {
            id: arrow.id(),
            source_id: arrow.source_id(),
            target_id: arrow.target_id(),
            arrow_type: arrow.arrow_type(),
            flow_id: arrow.flow_id(),
            path: arrow_path(&source.rect, &target.rect, arrow.arrow_type(), config),
            selected: false,
        })
    }

    pub fn tab(&self) -> Option<(TabKind, EntityId)> {
        self.tab
    }

    pub fn nodes(&self) -> &[CanvasNode] {
        &self.nodes
    }

    pub fn arrows(&self) -> &[CanvasArrow] {
        &self.arrows
    }

    pub fn node(&self, entity_id: EntityId) -> Option<&CanvasNode> {
        self.nodes.iter().find(|node| node.id() == entity_id)
    }

    pub fn contains_key(&self, key: SelectionKey) -> bool {
        self.nodes.iter().any(|node| node.key == key)
    }

    pub fn arrow(&self, arrow_id: ArrowId) -> Option<&CanvasArrow> {
        self.arrows.iter().find(|arrow| arrow.id == arrow_id)
    }

    /// Topmost node containing `point` (later nodes draw on top).
    pub fn node_at(&self, point: glam::DVec2) -> Option<&CanvasNode> {
        self.nodes.iter().rev().find(|node| node.rect.contains(point))
    }

    /// Bounding box of every node.
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .map(|node| node.rect)
            .reduce(|acc, rect| acc.union(&rect))
    }

    /// Applies a committed move in place. `None` snaps the node to its default slot.
    pub fn apply_move(&mut self, entity_id: EntityId, position: Option<Xywh>, config: &EditorConfig) -> bool {
        let Some(index) = self.nodes.iter().position(|node| node.id() == entity_id) else {
            return false;
        };
        let xywh = position.unwrap_or_else(|| default_slot(index, config));
        let node = &mut self.nodes[index];
        node.rect = xywh.into();
        node.placed = position.is_some();
        self.refresh_arrow_paths(config);
        true
    }

    /// Live position update while dragging; nothing is committed.
    pub fn set_node_origin(&mut self, entity_id: EntityId, origin: glam::DVec2, config: &EditorConfig) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|node| node.id() == entity_id) else {
            return false;
        };
        let size = node.rect.max - node.rect.min;
        node.rect = Rect {
            min: origin,
            max: origin + size,
        };
        self.refresh_arrow_paths(config);
        true
    }

    pub fn rename(&mut self, entity_id: EntityId, name: &str) -> bool {
        let mut changed = false;
        for node in self.nodes.iter_mut().filter(|node| node.id() == entity_id) {
            node.name = name.into();
            changed = true;
        }
        changed
    }

    pub fn refresh_arrow_paths(&mut self, config: &EditorConfig) {
        let rects = self
            .nodes
            .iter()
            .map(|node| (node.id(), node.rect))
            .collect::<HashMap<_, _>>();
        for arrow in &mut self.arrows {
            let (Some(source), Some(target)) = (rects.get(&arrow.source_id), rects.get(&arrow.target_id)) else {
                continue;
            };
            arrow.path = arrow_path(source, target, arrow.arrow_type, config);
        }
    }

    pub fn apply_selection(&mut self, order: &HashMap<SelectionKey, usize>, arrows: &[ArrowId]) {
        for node in &mut self.nodes {
            node.selection_order = order.get(&node.key).copied().unwrap_or(0);
        }
        for arrow in &mut self.arrows {
            arrow.selected = arrows.contains(&arrow.id);
        }
    }
}

/// Flows whose arrows a tab shows.
pub(crate) fn flow_ids_for_tab(store: &EntityStore, kind: TabKind, root_id: EntityId) -> Vec<EntityId> {
    match kind {
        TabKind::System => store
            .children_of_type(root_id, EntityType::Flow)
            .map(Entity::id)
            .collect(),
        TabKind::Flow => vec![root_id],
        TabKind::Work => store
            .entity(root_id)
            .and_then(Entity::parent_id)
            .into_iter()
            .collect(),
    }
}
