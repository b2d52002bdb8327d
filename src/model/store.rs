// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::arrow::Arrow;
use super::entity::{Entity, EntityType};
use super::ids::{ArrowId, EntityId};

/// One revision of the entity graph.
///
/// Entities and arrows live in id-indexed maps; parent/child order is kept in a separate
/// index so a removed child can be re-inserted at its original position. Raw mutators are
/// crate-private: every change goes through `ops::apply_op`, which validates structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    entities: BTreeMap<EntityId, Entity>,
    roots: Vec<EntityId>,
    children: BTreeMap<EntityId, Vec<EntityId>>,
    arrows: BTreeMap<ArrowId, Arrow>,
    arrow_order: Vec<ArrowId>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.arrows.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn arrow_count(&self) -> usize {
        self.arrows.len()
    }

    pub fn entity(&self, entity_id: EntityId) -> Option<&Entity> {
        self.entities.get(&entity_id)
    }

    pub fn contains(&self, entity_id: EntityId) -> bool {
        self.entities.contains_key(&entity_id)
    }

    pub fn entity_of_type(&self, entity_id: EntityId, entity_type: EntityType) -> Option<&Entity> {
        self.entity(entity_id)
            .filter(|entity| entity.entity_type() == entity_type)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    pub fn children(&self, parent_id: EntityId) -> &[EntityId] {
        self.children
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn children_of_type(
        &self,
        parent_id: EntityId,
        entity_type: EntityType,
    ) -> impl Iterator<Item = &Entity> {
        self.children(parent_id)
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(move |entity| entity.entity_type() == entity_type)
    }

    /// Position of `entity_id` among its siblings (or among the roots).
    pub fn sibling_index(&self, entity_id: EntityId) -> Option<usize> {
        let entity = self.entities.get(&entity_id)?;
        let siblings = match entity.parent_id() {
            Some(parent_id) => self.children(parent_id),
            None => &self.roots,
        };
        siblings.iter().position(|id| *id == entity_id)
    }

    /// Index among siblings of the same type; used for default canvas slots.
    pub fn typed_sibling_index(&self, entity_id: EntityId) -> Option<usize> {
        let entity = self.entities.get(&entity_id)?;
        let siblings = match entity.parent_id() {
            Some(parent_id) => self.children(parent_id),
            None => &self.roots,
        };
        siblings
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|sibling| sibling.entity_type() == entity.entity_type())
            .position(|sibling| sibling.id() == entity_id)
    }

    /// Ancestors of `entity_id`, nearest first.
    pub fn ancestors(&self, entity_id: EntityId) -> Ancestors<'_> {
        Ancestors {
            store: self,
            next: self.entities.get(&entity_id).and_then(Entity::parent_id),
        }
    }

    pub fn is_ancestor(&self, ancestor_id: EntityId, entity_id: EntityId) -> bool {
        self.ancestors(entity_id).any(|entity| entity.id() == ancestor_id)
    }

    pub fn ancestor_of_type(&self, entity_id: EntityId, entity_type: EntityType) -> Option<&Entity> {
        self.ancestors(entity_id)
            .find(|entity| entity.entity_type() == entity_type)
    }

    /// The entity itself followed by all descendants, parents before children.
    pub fn subtree(&self, entity_id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        if !self.contains(entity_id) {
            return out;
        }
        let mut stack = vec![entity_id];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.children(id).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Every entity in document order (roots first, depth-first, siblings in order).
    pub fn entities_in_order(&self) -> Vec<&Entity> {
        self.roots
            .iter()
            .flat_map(|root| self.subtree(*root))
            .filter_map(|id| self.entities.get(&id))
            .collect()
    }

    pub fn arrow(&self, arrow_id: ArrowId) -> Option<&Arrow> {
        self.arrows.get(&arrow_id)
    }

    /// Arrows in creation order.
    pub fn arrows(&self) -> impl Iterator<Item = &Arrow> {
        self.arrow_order
            .iter()
            .filter_map(|id| self.arrows.get(id))
    }

    pub fn arrow_index(&self, arrow_id: ArrowId) -> Option<usize> {
        self.arrow_order.iter().position(|id| *id == arrow_id)
    }

    pub(crate) fn insert_entity(&mut self, entity: Entity, index: Option<usize>) {
        let id = entity.id();
        let siblings = match entity.parent_id() {
            Some(parent_id) => self.children.entry(parent_id).or_default(),
            None => &mut self.roots,
        };
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, id);
        self.entities.insert(id, entity);
    }

    /// Removes a leaf entity, returning it with its former sibling index.
    pub(crate) fn remove_entity(&mut self, entity_id: EntityId) -> Option<(Entity, usize)> {
        let index = self.sibling_index(entity_id)?;
        let entity = self.entities.remove(&entity_id)?;
        match entity.parent_id() {
            Some(parent_id) => {
                if let Some(siblings) = self.children.get_mut(&parent_id) {
                    siblings.remove(index);
                    if siblings.is_empty() {
                        self.children.remove(&parent_id);
                    }
                }
            }
            None => {
                self.roots.remove(index);
            }
        }
        self.children.remove(&entity_id);
        Some((entity, index))
    }

    /// Swaps in `entity` for the entity with the same id. Parent links are not touched.
    pub(crate) fn replace_entity(&mut self, entity: Entity) -> Option<Entity> {
        let slot = self.entities.get_mut(&entity.id())?;
        let mut entity = entity;
        entity.set_parent_id(slot.parent_id());
        Some(std::mem::replace(slot, entity))
    }

    /// Moves `entity_id` under `parent_id`, returning the former parent and sibling index.
    pub(crate) fn reparent(
        &mut self,
        entity_id: EntityId,
        parent_id: EntityId,
        index: Option<usize>,
    ) -> Option<(Option<EntityId>, usize)> {
        let old_index = self.sibling_index(entity_id)?;
        let old_parent = self.entities.get(&entity_id)?.parent_id();
        match old_parent {
            Some(old_parent_id) => {
                if let Some(siblings) = self.children.get_mut(&old_parent_id) {
                    siblings.remove(old_index);
                    if siblings.is_empty() {
                        self.children.remove(&old_parent_id);
                    }
                }
            }
            None => {
                self.roots.remove(old_index);
            }
        }
        let siblings = self.children.entry(parent_id).or_default();
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, entity_id);
        if let Some(entity) = self.entities.get_mut(&entity_id) {
            entity.set_parent_id(Some(parent_id));
        }
        Some((old_parent, old_index))
    }

    pub(crate) fn insert_arrow(&mut self, arrow: Arrow, index: Option<usize>) {
        let id = arrow.id();
        let at = index
            .unwrap_or(self.arrow_order.len())
            .min(self.arrow_order.len());
        self.arrow_order.insert(at, id);
        self.arrows.insert(id, arrow);
    }

    pub(crate) fn remove_arrow(&mut self, arrow_id: ArrowId) -> Option<(Arrow, usize)> {
        let index = self.arrow_index(arrow_id)?;
        let arrow = self.arrows.remove(&arrow_id)?;
        self.arrow_order.remove(index);
        Some((arrow, index))
    }

    pub(crate) fn replace_arrow(&mut self, arrow: Arrow) -> Option<Arrow> {
        let slot = self.arrows.get_mut(&arrow.id())?;
        Some(std::mem::replace(slot, arrow))
    }
}

pub struct Ancestors<'a> {
    store: &'a EntityStore,
    next: Option<EntityId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let entity = self.store.entities.get(&self.next?)?;
        self.next = entity.parent_id();
        Some(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::EntityStore;
    use crate::model::{Entity, EntityType};

    #[test]
    fn remove_then_insert_restores_sibling_order() {
        let mut store = EntityStore::new();
        let project = Entity::new(EntityType::Project, "P", None);
        let project_id = project.id();
        store.insert_entity(project, None);

        let ids = ["A", "B", "C"]
            .into_iter()
            .map(|name| {
                let system = Entity::new(EntityType::System, name, Some(project_id));
                let id = system.id();
                store.insert_entity(system, None);
                id
            })
            .collect::<Vec<_>>();
        let before = store.clone();

        let (removed, index) = store.remove_entity(ids[1]).expect("remove");
        assert_eq!(index, 1);
        assert_eq!(store.children(project_id), &[ids[0], ids[2]]);

        store.insert_entity(removed, Some(index));
        assert_eq!(store, before);
    }

    #[test]
    fn ancestors_walk_to_the_root() {
        let mut store = EntityStore::new();
        let project = Entity::new(EntityType::Project, "P", None);
        let system = Entity::new(EntityType::System, "S", Some(project.id()));
        let flow = Entity::new(EntityType::Flow, "F", Some(system.id()));
        let (project_id, system_id, flow_id) = (project.id(), system.id(), flow.id());
        store.insert_entity(project, None);
        store.insert_entity(system, None);
        store.insert_entity(flow, None);

        let chain = store.ancestors(flow_id).map(Entity::id).collect::<Vec<_>>();
        assert_eq!(chain, vec![system_id, project_id]);
        assert!(store.is_ancestor(project_id, flow_id));
        assert!(!store.is_ancestor(flow_id, project_id));
        assert_eq!(store.subtree(project_id), vec![project_id, system_id, flow_id]);
    }
}
