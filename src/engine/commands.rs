// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Translation of commands into primitive ops.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use smol_str::SmolStr;

use crate::config::EditorConfig;
use crate::model::{
    ApiCall, ApiCallId, ApiDefProps, Arrow, ArrowId, ArrowType, EndpointKind, Entity, EntityId,
    EntityProps, EntityStore, EntityType, Xywh,
};
use crate::ops::{Op, Transaction};

use super::fields::{parse_duration, parse_timeout};
use super::queries::resolve_flow_for_connect;
use super::{Command, EditorError};

/// Applies the ops of `command` to `tx`. Leaves `tx` empty when the command changes nothing.
pub(crate) fn run(
    tx: &mut Transaction,
    command: Command,
    config: &EditorConfig,
) -> Result<(), EditorError> {
    match command {
        Command::AddProject { name } => add_entity(tx, EntityType::Project, name, None, None),
        Command::AddSystem {
            project_id,
            name,
            is_active,
        } => {
            require(tx.store(), project_id, EntityType::Project)?;
            let mut system = Entity::new(EntityType::System, non_empty(&name)?, Some(project_id));
            system.set_props(EntityProps::System { is_active });
            tx.apply(Op::InsertEntity {
                entity: system,
                index: None,
            })?;
            Ok(())
        }
        Command::AddFlow { system_id, name } => {
            require(tx.store(), system_id, EntityType::System)?;
            add_entity(tx, EntityType::Flow, name, Some(system_id), None)
        }
        Command::AddWork {
            flow_id,
            name,
            position,
        } => {
            require(tx.store(), flow_id, EntityType::Flow)?;
            add_entity(tx, EntityType::Work, name, Some(flow_id), position)
        }
        Command::AddCall {
            work_id,
            name,
            position,
            api_def_ids,
        } => add_call(tx, work_id, name, position, &api_def_ids),
        Command::AddApiDef { system_id, name } => {
            require(tx.store(), system_id, EntityType::System)?;
            add_entity(tx, EntityType::ApiDef, name, Some(system_id), None)
        }
        Command::AddHwComponent {
            system_id,
            kind,
            name,
        } => {
            if !kind.is_hw_component() {
                return Err(EditorError::NotHwComponent { entity_type: kind });
            }
            require(tx.store(), system_id, EntityType::System)?;
            add_entity(tx, kind, name, Some(system_id), None)
        }
        Command::RenameEntity { id, new_name } => rename(tx, id, &new_name),
        Command::MoveEntities { moves } => move_entities(tx, &moves),
        Command::Reparent { id, new_parent_id } => reparent(tx, id, new_parent_id),
        Command::RemoveEntities { ids } => remove_entities(tx, &ids),
        Command::AddArrow {
            source_id,
            target_id,
            arrow_type,
        } => {
            let arrow = plan_arrow(tx.store(), source_id, target_id, arrow_type)?;
            tx.apply(Op::InsertArrow { arrow, index: None })?;
            Ok(())
        }
        Command::RemoveArrows { ids } => remove_arrows(tx, &ids),
        Command::ReconnectArrow {
            arrow_id,
            replace_source,
            new_endpoint_id,
        } => reconnect_arrow(tx, arrow_id, replace_source, new_endpoint_id),
        Command::ConnectInOrder {
            ordered,
            arrow_type,
        } => connect_in_order(tx, &ordered, arrow_type),
        Command::UpdateWorkDuration { work_id, text } => {
            let duration = parse_duration(&text)?;
            update_props(tx, work_id, EntityType::Work, |props| {
                if let EntityProps::Work(work) = props {
                    work.duration = duration;
                }
                Ok(())
            })
        }
        Command::UpdateCallTimeout { call_id, text } => {
            let timeout_ms = parse_timeout(&text)?;
            update_props(tx, call_id, EntityType::Call, |props| {
                if let EntityProps::Call(call) = props {
                    call.timeout_ms = timeout_ms;
                }
                Ok(())
            })
        }
        Command::UpdateApiDefProperties { api_def_id, props } => {
            update_api_def(tx, api_def_id, props)
        }
        Command::AddApiCall {
            call_id,
            name,
            api_def_id,
        } => {
            let name = non_empty(&name)?;
            if let Some(api_def_id) = api_def_id {
                require(tx.store(), api_def_id, EntityType::ApiDef)?;
            }
            update_props(tx, call_id, EntityType::Call, |props| {
                if let EntityProps::Call(call) = props {
                    call.api_calls.push(ApiCall::new(name, api_def_id));
                }
                Ok(())
            })
        }
        Command::UpdateApiCall { call_id, api_call } => {
            if let Some(api_def_id) = api_call.api_def_id {
                require(tx.store(), api_def_id, EntityType::ApiDef)?;
            }
            update_props(tx, call_id, EntityType::Call, |props| {
                let EntityProps::Call(call) = props else {
                    return Ok(());
                };
                let slot = call
                    .api_calls
                    .iter_mut()
                    .find(|existing| existing.id == api_call.id)
                    .ok_or(EditorError::ApiCallNotFound(api_call.id))?;
                *slot = api_call;
                Ok(())
            })
        }
        Command::RemoveApiCall {
            call_id,
            api_call_id,
        } => update_props(tx, call_id, EntityType::Call, |props| {
            let EntityProps::Call(call) = props else {
                return Ok(());
            };
            let before = call.api_calls.len();
            call.api_calls.retain(|existing| existing.id != api_call_id);
            if call.api_calls.len() == before {
                return Err(EditorError::ApiCallNotFound(api_call_id));
            }
            Ok(())
        }),
        Command::PasteEntities {
            source_ids,
            target_id,
        } => paste_entities(tx, &source_ids, target_id, config),
    }
}

fn non_empty(name: &str) -> Result<SmolStr, EditorError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EditorError::EmptyName);
    }
    Ok(trimmed.into())
}

pub(crate) fn require(
    store: &EntityStore,
    entity_id: EntityId,
    expected: EntityType,
) -> Result<&Entity, EditorError> {
    let entity = store
        .entity(entity_id)
        .ok_or(EditorError::EntityNotFound(entity_id))?;
    if entity.entity_type() != expected {
        return Err(EditorError::WrongType {
            entity_id,
            expected,
            found: entity.entity_type(),
        });
    }
    Ok(entity)
}

fn add_entity(
    tx: &mut Transaction,
    entity_type: EntityType,
    name: SmolStr,
    parent_id: Option<EntityId>,
    position: Option<Xywh>,
) -> Result<(), EditorError> {
    let mut entity = Entity::new(entity_type, non_empty(&name)?, parent_id);
    entity.set_position(position);
    tx.apply(Op::InsertEntity {
        entity,
        index: None,
    })?;
    Ok(())
}

fn add_call(
    tx: &mut Transaction,
    work_id: EntityId,
    name: SmolStr,
    position: Option<Xywh>,
    api_def_ids: &[EntityId],
) -> Result<(), EditorError> {
    require(tx.store(), work_id, EntityType::Work)?;
    let mut api_calls = Vec::with_capacity(api_def_ids.len());
    for api_def_id in api_def_ids {
        let api_def = require(tx.store(), *api_def_id, EntityType::ApiDef)?;
        api_calls.push(ApiCall::new(api_def.name(), Some(*api_def_id)));
    }

    let mut call = Entity::new(EntityType::Call, non_empty(&name)?, Some(work_id));
    if let EntityProps::Call(props) = call.props_mut() {
        props.position = position;
        props.api_calls = api_calls;
    }
    tx.apply(Op::InsertEntity {
        entity: call,
        index: None,
    })?;
    Ok(())
}

fn rename(tx: &mut Transaction, id: EntityId, new_name: &str) -> Result<(), EditorError> {
    let name = non_empty(new_name)?;
    let entity = tx
        .store()
        .entity(id)
        .ok_or(EditorError::EntityNotFound(id))?;
    if entity.name() == name {
        return Ok(());
    }
    let mut renamed = entity.clone();
    renamed.set_name(name);
    tx.apply(Op::UpdateEntity { entity: renamed })?;
    Ok(())
}

fn move_entities(
    tx: &mut Transaction,
    moves: &[(EntityId, Option<Xywh>)],
) -> Result<(), EditorError> {
    for (id, position) in moves {
        let entity = tx
            .store()
            .entity(*id)
            .ok_or(EditorError::EntityNotFound(*id))?;
        if !entity.entity_type().is_work_or_call() {
            return Err(EditorError::NotMovable {
                entity_id: *id,
                entity_type: entity.entity_type(),
            });
        }
        if entity.position() == *position {
            continue;
        }
        let mut moved = entity.clone();
        moved.set_position(*position);
        tx.apply(Op::UpdateEntity { entity: moved })?;
    }
    Ok(())
}

fn reparent(
    tx: &mut Transaction,
    id: EntityId,
    new_parent_id: EntityId,
) -> Result<(), EditorError> {
    let entity = tx
        .store()
        .entity(id)
        .ok_or(EditorError::EntityNotFound(id))?;
    if entity.parent_id() == Some(new_parent_id) {
        return Ok(());
    }
    tx.apply(Op::Reparent {
        entity_id: id,
        parent_id: new_parent_id,
        index: None,
    })?;

    // Arrows touching the moved subtree must still resolve to one flow.
    let moved = tx.store().subtree(id).into_iter().collect::<HashSet<_>>();
    let affected = tx
        .store()
        .arrows()
        .filter(|arrow| moved.contains(&arrow.source_id()) || moved.contains(&arrow.target_id()))
        .cloned()
        .collect::<Vec<_>>();
    for arrow in affected {
        match resolve_flow_for_connect(tx.store(), arrow.source_id(), arrow.target_id()) {
            None => tx.apply(Op::RemoveArrow {
                arrow_id: arrow.id(),
            })?,
            Some(flow_id) if flow_id != arrow.flow_id() => tx.apply(Op::UpdateArrow {
                arrow: arrow.with_endpoint(true, arrow.source_id(), flow_id),
            })?,
            Some(_) => {}
        }
    }
    Ok(())
}

fn remove_entities(tx: &mut Transaction, ids: &[EntityId]) -> Result<(), EditorError> {
    let store = tx.store();
    let mut requested = Vec::new();
    for id in ids {
        if !store.contains(*id) {
            return Err(EditorError::EntityNotFound(*id));
        }
        if !requested.contains(id) {
            requested.push(*id);
        }
    }
    let roots = requested
        .iter()
        .copied()
        .filter(|id| !requested.iter().any(|other| store.is_ancestor(*other, *id)))
        .collect::<Vec<_>>();
    let subtrees = roots
        .iter()
        .map(|root| store.subtree(*root))
        .collect::<Vec<_>>();
    let removed = subtrees
        .iter()
        .flatten()
        .copied()
        .collect::<HashSet<_>>();

    let mut ops = Vec::new();
    for arrow in store.arrows() {
        if removed.contains(&arrow.source_id())
            || removed.contains(&arrow.target_id())
            || removed.contains(&arrow.flow_id())
        {
            ops.push(Op::RemoveArrow {
                arrow_id: arrow.id(),
            });
        }
    }

    // Unlink surviving references into the removed set.
    for entity in store.entities() {
        if removed.contains(&entity.id()) {
            continue;
        }
        match entity.props() {
            EntityProps::Call(call)
                if call
                    .api_calls
                    .iter()
                    .any(|api_call| api_call.api_def_id.is_some_and(|id| removed.contains(&id))) =>
            {
                let mut updated = entity.clone();
                if let EntityProps::Call(props) = updated.props_mut() {
                    for api_call in &mut props.api_calls {
                        if api_call.api_def_id.is_some_and(|id| removed.contains(&id)) {
                            api_call.api_def_id = None;
                        }
                    }
                }
                ops.push(Op::UpdateEntity { entity: updated });
            }
            EntityProps::ApiDef(api_def)
                if api_def.tx_work.is_some_and(|id| removed.contains(&id))
                    || api_def.rx_work.is_some_and(|id| removed.contains(&id)) =>
            {
                let mut props = api_def.clone();
                props.tx_work = props.tx_work.filter(|id| !removed.contains(id));
                props.rx_work = props.rx_work.filter(|id| !removed.contains(id));
                let mut updated = entity.clone();
                updated.set_props(EntityProps::ApiDef(props));
                ops.push(Op::UpdateEntity { entity: updated });
            }
            _ => {}
        }
    }

    for subtree in &subtrees {
        for entity_id in subtree.iter().rev() {
            ops.push(Op::RemoveEntity {
                entity_id: *entity_id,
            });
        }
    }

    for op in ops {
        tx.apply(op)?;
    }
    Ok(())
}

fn remove_arrows(tx: &mut Transaction, ids: &[ArrowId]) -> Result<(), EditorError> {
    let mut seen = HashSet::new();
    for arrow_id in ids {
        if !seen.insert(*arrow_id) {
            continue;
        }
        if tx.store().arrow(*arrow_id).is_none() {
            return Err(EditorError::ArrowNotFound(*arrow_id));
        }
        tx.apply(Op::RemoveArrow {
            arrow_id: *arrow_id,
        })?;
    }
    Ok(())
}

/// Validates a new arrow and resolves its flow.
pub(crate) fn plan_arrow(
    store: &EntityStore,
    source_id: EntityId,
    target_id: EntityId,
    arrow_type: ArrowType,
) -> Result<Arrow, EditorError> {
    if source_id == target_id {
        return Err(EditorError::SelfConnection(source_id));
    }
    let source = store
        .entity(source_id)
        .ok_or(EditorError::EntityNotFound(source_id))?;
    let target = store
        .entity(target_id)
        .ok_or(EditorError::EntityNotFound(target_id))?;
    let unconnectable = EditorError::Unconnectable {
        source_id,
        target_id,
    };
    let Some(kind) = EndpointKind::of(source.entity_type()) else {
        return Err(unconnectable);
    };
    if EndpointKind::of(target.entity_type()) != Some(kind) {
        return Err(unconnectable);
    }
    if !arrow_type.is_allowed_for(kind) {
        return Err(EditorError::ArrowTypeNotAllowed { arrow_type, kind });
    }
    let flow_id = resolve_flow_for_connect(store, source_id, target_id).ok_or(unconnectable)?;
    Ok(Arrow::new(
        ArrowId::new(),
        source_id,
        target_id,
        arrow_type,
        flow_id,
        kind,
    ))
}

fn reconnect_arrow(
    tx: &mut Transaction,
    arrow_id: ArrowId,
    replace_source: bool,
    new_endpoint_id: EntityId,
) -> Result<(), EditorError> {
    let store = tx.store();
    let arrow = store
        .arrow(arrow_id)
        .ok_or(EditorError::ArrowNotFound(arrow_id))?;
    let (current, other) = if replace_source {
        (arrow.source_id(), arrow.target_id())
    } else {
        (arrow.target_id(), arrow.source_id())
    };
    if current == new_endpoint_id {
        return Ok(());
    }
    if other == new_endpoint_id {
        return Err(EditorError::SelfConnection(new_endpoint_id));
    }
    let endpoint = store
        .entity(new_endpoint_id)
        .ok_or(EditorError::EntityNotFound(new_endpoint_id))?;
    let (source_id, target_id) = if replace_source {
        (new_endpoint_id, other)
    } else {
        (other, new_endpoint_id)
    };
    let unconnectable = EditorError::Unconnectable {
        source_id,
        target_id,
    };
    if EndpointKind::of(endpoint.entity_type()) != Some(arrow.endpoint_kind()) {
        return Err(unconnectable);
    }
    let flow_id = resolve_flow_for_connect(store, source_id, target_id).ok_or(unconnectable)?;
    let updated = arrow.with_endpoint(replace_source, new_endpoint_id, flow_id);
    tx.apply(Op::UpdateArrow { arrow: updated })?;
    Ok(())
}

fn connect_in_order(
    tx: &mut Transaction,
    ordered: &[EntityId],
    arrow_type: ArrowType,
) -> Result<(), EditorError> {
    if ordered.len() < 2 {
        return Err(EditorError::NotEnoughNodes(ordered.len()));
    }
    // Pairs that cannot be connected (another flow, another endpoint kind) are skipped; the
    // command fails only when no pair connects.
    let mut created = 0usize;
    let mut skipped = None;
    for pair in ordered.windows(2) {
        match plan_arrow(tx.store(), pair[0], pair[1], arrow_type) {
            Ok(arrow) => {
                tx.apply(Op::InsertArrow { arrow, index: None })?;
                created += 1;
            }
            Err(err) if err.is_validation() => {
                debug!("connect in order: skipping {} -> {}: {err}", pair[0], pair[1]);
                skipped = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    match skipped {
        Some(err) if created == 0 => Err(err),
        _ => Ok(()),
    }
}

fn update_props(
    tx: &mut Transaction,
    entity_id: EntityId,
    expected: EntityType,
    edit: impl FnOnce(&mut EntityProps) -> Result<(), EditorError>,
) -> Result<(), EditorError> {
    let entity = require(tx.store(), entity_id, expected)?;
    let mut updated = entity.clone();
    edit(updated.props_mut())?;
    if updated == *entity {
        return Ok(());
    }
    tx.apply(Op::UpdateEntity { entity: updated })?;
    Ok(())
}

fn update_api_def(
    tx: &mut Transaction,
    api_def_id: EntityId,
    props: ApiDefProps,
) -> Result<(), EditorError> {
    for work_id in [props.tx_work, props.rx_work].into_iter().flatten() {
        require(tx.store(), work_id, EntityType::Work)?;
    }
    update_props(tx, api_def_id, EntityType::ApiDef, |existing| {
        *existing = EntityProps::ApiDef(props);
        Ok(())
    })
}

/// The parent pasted copies go under: the target itself, or the target's parent when the target
/// is a sibling of the sources' type.
fn resolve_paste_parent(
    store: &EntityStore,
    batch_type: EntityType,
    target_id: EntityId,
) -> Result<EntityId, EditorError> {
    let target = store
        .entity(target_id)
        .ok_or(EditorError::EntityNotFound(target_id))?;
    let invalid = EditorError::InvalidPasteTarget {
        entity_type: batch_type,
        target_type: target.entity_type(),
    };
    if Some(target.entity_type()) == batch_type.parent_type() {
        return Ok(target_id);
    }
    if target.entity_type() == batch_type {
        return target.parent_id().ok_or(invalid);
    }
    Err(invalid)
}

fn paste_entities(
    tx: &mut Transaction,
    source_ids: &[EntityId],
    target_id: EntityId,
    config: &EditorConfig,
) -> Result<(), EditorError> {
    let store = tx.store();
    let Some(first) = source_ids.first() else {
        return Ok(());
    };
    let first = store
        .entity(*first)
        .ok_or(EditorError::EntityNotFound(*first))?;
    let batch_type = first.entity_type();
    if !batch_type.is_copyable() {
        return Err(EditorError::NotCopyable {
            entity_type: batch_type,
        });
    }
    for id in source_ids {
        let source = store.entity(*id).ok_or(EditorError::EntityNotFound(*id))?;
        if source.entity_type() != batch_type || source.parent_id() != first.parent_id() {
            return Err(EditorError::MixedPasteSources);
        }
    }
    let parent_id = resolve_paste_parent(store, batch_type, target_id)?;

    let mut id_map = BTreeMap::new();
    let mut inserts = Vec::new();
    let mut seen = HashSet::new();
    for root_id in source_ids {
        if !seen.insert(*root_id) {
            continue;
        }
        for old_id in store.subtree(*root_id) {
            let Some(original) = store.entity(old_id) else {
                continue;
            };
            let new_id = EntityId::new();
            id_map.insert(old_id, new_id);
            let new_parent = if old_id == *root_id {
                Some(parent_id)
            } else {
                original.parent_id().and_then(|id| id_map.get(&id).copied())
            };
            let mut copy =
                Entity::with_id(new_id, original.entity_type(), original.name(), new_parent);
            let mut props = original.props().clone();
            if let EntityProps::Call(call) = &mut props {
                for api_call in &mut call.api_calls {
                    api_call.id = ApiCallId::new();
                }
            }
            copy.set_props(props);
            if old_id == *root_id {
                if let Some(pos) = copy.position() {
                    copy.set_position(Some(Xywh::new(
                        pos.x + config.paste_offset,
                        pos.y + config.paste_offset,
                        pos.w,
                        pos.h,
                    )));
                }
            }
            inserts.push(copy);
        }
    }

    let copied_arrows = store
        .arrows()
        .filter_map(|arrow| {
            let source = id_map.get(&arrow.source_id())?;
            let target = id_map.get(&arrow.target_id())?;
            Some((*source, *target, arrow.arrow_type(), arrow.endpoint_kind()))
        })
        .collect::<Vec<_>>();

    for entity in inserts {
        tx.apply(Op::InsertEntity {
            entity,
            index: None,
        })?;
    }
    for (source_id, target_id, arrow_type, kind) in copied_arrows {
        let Some(flow_id) = resolve_flow_for_connect(tx.store(), source_id, target_id) else {
            continue;
        };
        tx.apply(Op::InsertArrow {
            arrow: Arrow::new(ArrowId::new(), source_id, target_id, arrow_type, flow_id, kind),
            index: None,
        })?;
    }
    Ok(())
}
