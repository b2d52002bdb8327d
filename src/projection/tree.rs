// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, HashSet};

use smol_str::SmolStr;

use crate::model::{Entity, EntityId, EntityStore, EntityType, SelectionKey};

const API_DEF_CATEGORY_NAME: &str = "ApiDefs";

/// Which of the two trees has focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TreePane {
    /// Projects with their active systems.
    #[default]
    Control,
    /// Projects with their passive (device) systems.
    Device,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub key: SelectionKey,
    pub name: SmolStr,
    pub parent_id: Option<EntityId>,
    pub children: Vec<TreeNode>,
    pub expanded: bool,
    /// 1-based position in the ordered selection, `0` when not selected.
    pub selection_order: usize,
}

impl TreeNode {
    fn new(key: SelectionKey, name: impl Into<SmolStr>, parent_id: Option<EntityId>) -> Self {
        Self {
            key,
            name: name.into(),
            parent_id,
            children: Vec::new(),
            expanded: false,
            selection_order: 0,
        }
    }

    fn of(entity: &Entity) -> Self {
        Self::new(entity.key(), entity.name(), entity.parent_id())
    }

    pub fn is_selected(&self) -> bool {
        self.selection_order > 0
    }
}

/// The control and device trees plus the expansion state that survives rebuilds.
#[derive(Debug, Clone, Default)]
pub struct TreeProjection {
    control: Vec<TreeNode>,
    device: Vec<TreeNode>,
    expanded: HashSet<SelectionKey>,
}

impl TreeProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(store: &EntityStore) -> Self {
        let mut tree = Self::new();
        tree.rebuild(store);
        tree
    }

    /// Rebuilds both trees, keeping the expansion state of keys that still exist.
    pub fn rebuild(&mut self, store: &EntityStore) {
        let projects = store
            .roots()
            .iter()
            .filter_map(|id| store.entity_of_type(*id, EntityType::Project))
            .collect::<Vec<_>>();

        self.control = projects
            .iter()
            .map(|project| {
                let mut node = TreeNode::of(project);
                node.children = systems(store, project.id(), true);
                node
            })
            .collect();
        self.device = projects
            .iter()
            .map(|project| {
                let key = SelectionKey::new(project.id(), EntityType::DeviceRoot);
                let mut node = TreeNode::new(key, project.name(), None);
                node.children = systems(store, project.id(), false);
                node
            })
            .collect();

        let mut alive = HashSet::new();
        for root in self.control.iter().chain(self.device.iter()) {
            walk(root, &mut |node| {
                alive.insert(node.key);
            });
        }
        self.expanded.retain(|key| alive.contains(key));
        let expanded = &self.expanded;
        for root in self.control.iter_mut().chain(self.device.iter_mut()) {
            walk_mut(root, &mut |node| node.expanded = expanded.contains(&node.key));
        }
    }

    pub fn roots(&self, pane: TreePane) -> &[TreeNode] {
        match pane {
            TreePane::Control => &self.control,
            TreePane::Device => &self.device,
        }
    }

    /// Every node of both trees in pre-order, control tree first.
    pub fn nodes(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        for root in self.control.iter().chain(self.device.iter()) {
            walk(root, &mut |node| out.push(node));
        }
        out
    }

    /// Keys of the nodes a user can currently see in `pane`, in display order.
    pub fn visible_keys(&self, pane: TreePane) -> Vec<SelectionKey> {
        fn visit(node: &TreeNode, out: &mut Vec<SelectionKey>) {
            out.push(node.key);
            if node.expanded {
                for child in &node.children {
                    visit(child, out);
                }
            }
        }

        let mut out = Vec::new();
        for root in self.roots(pane) {
            visit(root, &mut out);
        }
        out
    }

    pub fn find(&self, key: SelectionKey) -> Option<&TreeNode> {
        self.nodes().into_iter().find(|node| node.key == key)
    }

    pub fn contains(&self, key: SelectionKey) -> bool {
        self.find(key).is_some()
    }

    /// The pane a key lives in, control tree first.
    pub fn pane_of(&self, key: SelectionKey) -> Option<TreePane> {
        [TreePane::Control, TreePane::Device]
            .into_iter()
            .find(|pane| {
                self.roots(*pane)
                    .iter()
                    .any(|root| path_to(root, &|node: &TreeNode| node.key == key).is_some())
            })
    }

    pub fn is_expanded(&self, key: SelectionKey) -> bool {
        self.expanded.contains(&key)
    }

    pub fn set_expanded(&mut self, key: SelectionKey, expanded: bool) {
        if expanded {
            self.expanded.insert(key);
        } else {
            self.expanded.remove(&key);
        }
        for root in self.control.iter_mut().chain(self.device.iter_mut()) {
            walk_mut(root, &mut |node| {
                if node.key == key {
                    node.expanded = expanded;
                }
            });
        }
    }

    /// Expands every ancestor of the first node with `entity_id`, making it visible.
    pub fn expand_ancestors(&mut self, entity_id: EntityId) {
        let path = self
            .control
            .iter()
            .chain(self.device.iter())
            .find_map(|root| path_to(root, &|node: &TreeNode| node.key.id == entity_id));
        let Some(mut path) = path else {
            return;
        };
        path.pop();
        for key in path {
            self.set_expanded(key, true);
        }
    }

    pub fn expand_node_and_ancestors(&mut self, entity_id: EntityId) {
        let key = self
            .nodes()
            .into_iter()
            .find(|node| node.key.id == entity_id)
            .map(|node| node.key);
        if let Some(key) = key {
            self.set_expanded(key, true);
        }
        self.expand_ancestors(entity_id);
    }

    /// Renames every node showing `entity_id` in place, including the device root that carries
    /// its project's name. The ApiDefs category keeps its fixed label.
    pub fn rename(&mut self, entity_id: EntityId, name: &str) -> bool {
        let mut changed = false;
        for root in self.control.iter_mut().chain(self.device.iter_mut()) {
            walk_mut(root, &mut |node| {
                if node.key.id == entity_id && node.key.entity_type != EntityType::ApiDefCategory {
                    node.name = name.into();
                    changed = true;
                }
            });
        }
        changed
    }

    pub fn apply_selection(&mut self, order: &HashMap<SelectionKey, usize>) {
        for root in self.control.iter_mut().chain(self.device.iter_mut()) {
            walk_mut(root, &mut |node| {
                node.selection_order = order.get(&node.key).copied().unwrap_or(0);
            });
        }
    }
}

fn systems(store: &EntityStore, project_id: EntityId, active: bool) -> Vec<TreeNode> {
    store
        .children_of_type(project_id, EntityType::System)
        .filter(|system| system.is_active_system() == active)
        .map(|system| system_node(store, system))
        .collect()
}

fn system_node(store: &EntityStore, system: &Entity) -> TreeNode {
    let mut node = TreeNode::of(system);
    for flow in store.children_of_type(system.id(), EntityType::Flow) {
        let mut flow_node = TreeNode::of(flow);
        for work in store.children_of_type(flow.id(), EntityType::Work) {
            let mut work_node = TreeNode::of(work);
            work_node.children = store
                .children_of_type(work.id(), EntityType::Call)
                .map(TreeNode::of)
                .collect();
            flow_node.children.push(work_node);
        }
        node.children.push(flow_node);
    }

    let category_key = SelectionKey::new(system.id(), EntityType::ApiDefCategory);
    let mut category = TreeNode::new(category_key, API_DEF_CATEGORY_NAME, Some(system.id()));
    category.children = store
        .children_of_type(system.id(), EntityType::ApiDef)
        .map(TreeNode::of)
        .collect();
    node.children.push(category);

    node.children.extend(
        store
            .children(system.id())
            .iter()
            .filter_map(|id| store.entity(*id))
            .filter(|entity| entity.entity_type().is_hw_component())
            .map(TreeNode::of),
    );
    node
}

fn walk<'a>(node: &'a TreeNode, visit: &mut impl FnMut(&'a TreeNode)) {
    visit(node);
    for child in &node.children {
        walk(child, visit);
    }
}

fn walk_mut(node: &mut TreeNode, visit: &mut impl FnMut(&mut TreeNode)) {
    visit(node);
    for child in &mut node.children {
        walk_mut(child, visit);
    }
}

/// Keys from `node` down to the first node matching `hit`, inclusive.
fn path_to(node: &TreeNode, hit: &impl Fn(&TreeNode) -> bool) -> Option<Vec<SelectionKey>> {
    if hit(node) {
        return Some(vec![node.key]);
    }
    node.children.iter().find_map(|child| {
        let mut path = path_to(child, hit)?;
        path.insert(0, node.key);
        Some(path)
    })
}
