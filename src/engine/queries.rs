// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only structural queries over a store revision.

use smol_str::SmolStr;

use crate::model::{Entity, EntityId, EntityStore, EntityType, SelectionKey};
use crate::projection::TabKind;

/// The flow a Work or Call belongs to.
pub fn flow_of(store: &EntityStore, entity_id: EntityId) -> Option<EntityId> {
    let entity = store.entity(entity_id)?;
    match entity.entity_type() {
        EntityType::Flow => Some(entity_id),
        EntityType::Work | EntityType::Call => store
            .ancestor_of_type(entity_id, EntityType::Flow)
            .map(Entity::id),
        _ => None,
    }
}

/// The flow an arrow between `source_id` and `target_id` would belong to.
///
/// Works must share their flow. Calls must share their flow through their parent works. Mixed
/// Work/Call pairs never resolve.
pub fn resolve_flow_for_connect(
    store: &EntityStore,
    source_id: EntityId,
    target_id: EntityId,
) -> Option<EntityId> {
    let source = store.entity(source_id)?;
    let target = store.entity(target_id)?;
    if source.entity_type() != target.entity_type() || !source.entity_type().is_work_or_call() {
        return None;
    }
    let source_flow = flow_of(store, source_id)?;
    let target_flow = flow_of(store, target_id)?;
    (source_flow == target_flow).then_some(source_flow)
}

pub fn project_of(store: &EntityStore, entity_id: EntityId) -> Option<EntityId> {
    let entity = store.entity(entity_id)?;
    if entity.entity_type() == EntityType::Project {
        return Some(entity_id);
    }
    store
        .ancestor_of_type(entity_id, EntityType::Project)
        .map(Entity::id)
}

pub fn system_of(store: &EntityStore, entity_id: EntityId) -> Option<EntityId> {
    let entity = store.entity(entity_id)?;
    if entity.entity_type() == EntityType::System {
        return Some(entity_id);
    }
    store
        .ancestor_of_type(entity_id, EntityType::System)
        .map(Entity::id)
}

/// All Works of all Flows of `system_id`, in document order.
pub fn works_for_system(store: &EntityStore, system_id: EntityId) -> Vec<&Entity> {
    store
        .children_of_type(system_id, EntityType::Flow)
        .flat_map(|flow| store.children_of_type(flow.id(), EntityType::Work))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiDefMatch {
    pub api_def_id: EntityId,
    pub name: SmolStr,
    pub system_id: EntityId,
    pub system_name: SmolStr,
}

/// ApiDefs whose name contains `filter` (case-insensitive), in document order.
pub fn find_api_defs_by_name(store: &EntityStore, filter: &str) -> Vec<ApiDefMatch> {
    let needle = filter.trim().to_lowercase();
    store
        .entities_in_order()
        .into_iter()
        .filter(|entity| entity.entity_type() == EntityType::ApiDef)
        .filter(|entity| needle.is_empty() || entity.name().to_lowercase().contains(&needle))
        .filter_map(|api_def| {
            let system = store.entity(api_def.parent_id()?)?;
            Some(ApiDefMatch {
                api_def_id: api_def.id(),
                name: api_def.name().into(),
                system_id: system.id(),
                system_name: system.name().into(),
            })
        })
        .collect()
}

/// The canvas tab an entity opens, if any: `(kind, root)`.
pub fn tab_open_info(store: &EntityStore, entity_id: EntityId) -> Option<(TabKind, EntityId)> {
    let entity = store.entity(entity_id)?;
    TabKind::for_entity_type(entity.entity_type()).map(|kind| (kind, entity_id))
}

pub fn tab_exists(store: &EntityStore, kind: TabKind, root_id: EntityId) -> bool {
    store.entity_of_type(root_id, kind.entity_type()).is_some()
}

/// Tab title: the root name, prefixed with the parent name for Work tabs (`Flow.Work`).
pub fn tab_title(store: &EntityStore, kind: TabKind, root_id: EntityId) -> Option<String> {
    let root = store.entity_of_type(root_id, kind.entity_type())?;
    match kind {
        TabKind::Work => {
            let flow = root.parent_id().and_then(|id| store.entity(id));
            Some(match flow {
                Some(flow) => format!("{}.{}", flow.name(), root.name()),
                None => root.name().to_owned(),
            })
        }
        TabKind::System | TabKind::Flow => Some(root.name().to_owned()),
    }
}

/// Where "Add System" should place the new system.
///
/// The selected entity's project wins, then the active tab's project, then the only project.
pub fn resolve_add_system_target(
    store: &EntityStore,
    selected: Option<SelectionKey>,
    active_tab: Option<(TabKind, EntityId)>,
) -> Option<EntityId> {
    selected
        .and_then(|key| project_of(store, key.id))
        .or_else(|| active_tab.and_then(|(_, root_id)| project_of(store, root_id)))
        .or_else(|| match store.roots() {
            [only] => Some(*only),
            _ => None,
        })
}

/// Where "Add Flow" should place the new flow: the selected or active-tab system.
pub fn resolve_add_flow_target(
    store: &EntityStore,
    selected: Option<SelectionKey>,
    active_tab: Option<(TabKind, EntityId)>,
) -> Option<EntityId> {
    let from_selection = selected.and_then(|key| match key.entity_type {
        EntityType::System
        | EntityType::Flow
        | EntityType::Work
        | EntityType::Call
        | EntityType::ApiDef
        | EntityType::ApiDefCategory => system_of(store, key.id),
        _ => None,
    });
    from_selection.or_else(|| active_tab.and_then(|(_, root_id)| system_of(store, root_id)))
}

/// The entity of `target_type` that is `selected`, else the root of a matching active tab.
pub fn resolve_target_of_type(
    store: &EntityStore,
    target_type: EntityType,
    selected: Option<SelectionKey>,
    active_tab: Option<(TabKind, EntityId)>,
) -> Option<EntityId> {
    if let Some(key) = selected.filter(|key| key.entity_type == target_type) {
        return store.entity_of_type(key.id, target_type).map(Entity::id);
    }
    active_tab
        .filter(|(kind, _)| kind.entity_type() == target_type)
        .and_then(|(_, root_id)| store.entity_of_type(root_id, target_type))
        .map(Entity::id)
}
