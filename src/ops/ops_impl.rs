// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Applies one op to `store` and returns its inverse. On error `store` is unchanged.
pub fn apply_op(store: &mut EntityStore, op: Op) -> Result<Applied, ApplyError> {
    match op {
        Op::InsertEntity { entity, index } => insert_entity(store, entity, index),
        Op::RemoveEntity { entity_id } => remove_entity(store, entity_id),
        Op::UpdateEntity { entity } => update_entity(store, entity),
        Op::Reparent {
            entity_id,
            parent_id,
            index,
        } => reparent(store, entity_id, parent_id, index),
        Op::InsertArrow { arrow, index } => insert_arrow(store, arrow, index),
        Op::RemoveArrow { arrow_id } => remove_arrow(store, arrow_id),
        Op::UpdateArrow { arrow } => update_arrow(store, arrow),
    }
}

fn check_parent(
    store: &EntityStore,
    entity_type: EntityType,
    parent_id: Option<EntityId>,
) -> Result<(), ApplyError> {
    let expected = entity_type.parent_type();
    let actual = match parent_id {
        Some(parent_id) => Some(
            store
                .entity(parent_id)
                .ok_or(ApplyError::ParentNotFound { parent_id })?
                .entity_type(),
        ),
        None => None,
    };
    if actual != expected {
        return Err(ApplyError::InvalidParent {
            entity_type,
            parent_type: actual,
        });
    }
    Ok(())
}

fn insert_entity(
    store: &mut EntityStore,
    entity: Entity,
    index: Option<usize>,
) -> Result<Applied, ApplyError> {
    let entity_id = entity.id();
    if store.contains(entity_id) {
        return Err(ApplyError::EntityExists { entity_id });
    }
    if !entity.entity_type().is_stored() {
        return Err(ApplyError::NotStorable {
            entity_type: entity.entity_type(),
        });
    }
    check_parent(store, entity.entity_type(), entity.parent_id())?;

    let key = entity.key();
    let parent_id = entity.parent_id();
    store.insert_entity(entity, index);
    Ok(Applied {
        inverse: Op::RemoveEntity { entity_id },
        events: smallvec::smallvec![EditorEvent::EntityAdded { key, parent_id }],
    })
}

fn remove_entity(store: &mut EntityStore, entity_id: EntityId) -> Result<Applied, ApplyError> {
    if !store.contains(entity_id) {
        return Err(ApplyError::EntityNotFound { entity_id });
    }
    if !store.children(entity_id).is_empty() {
        return Err(ApplyError::HasChildren { entity_id });
    }
    if store
        .arrows()
        .any(|arrow| arrow.touches(entity_id) || arrow.flow_id() == entity_id)
    {
        return Err(ApplyError::ArrowsAttached { entity_id });
    }

    let (entity, index) = store
        .remove_entity(entity_id)
        .ok_or(ApplyError::EntityNotFound { entity_id })?;
    let key = entity.key();
    Ok(Applied {
        inverse: Op::InsertEntity {
            entity,
            index: Some(index),
        },
        events: smallvec::smallvec![EditorEvent::EntityRemoved { key }],
    })
}

fn update_entity(store: &mut EntityStore, entity: Entity) -> Result<Applied, ApplyError> {
    let entity_id = entity.id();
    let Some(existing) = store.entity(entity_id) else {
        return Err(ApplyError::EntityNotFound { entity_id });
    };
    if existing.entity_type() != entity.entity_type() || existing.parent_id() != entity.parent_id()
    {
        return Err(ApplyError::IdentityChanged { entity_id });
    }
    let mut probe = existing.clone();
    if !probe.set_props(entity.props().clone()) {
        return Err(ApplyError::PropsMismatch { entity_id });
    }

    let events = entity_update_events(existing, &entity);
    let old = store
        .replace_entity(entity)
        .ok_or(ApplyError::EntityNotFound { entity_id })?;
    Ok(Applied {
        inverse: Op::UpdateEntity { entity: old },
        events,
    })
}

fn entity_update_events(old: &Entity, new: &Entity) -> OpEvents {
    use crate::model::EntityProps;

    let mut events = OpEvents::new();
    if old.name() != new.name() {
        events.push(EditorEvent::EntityRenamed {
            key: new.key(),
            new_name: new.name().into(),
        });
    }

    let id = new.id();
    match (old.props(), new.props()) {
        (EntityProps::Work(old_work), EntityProps::Work(new_work)) => {
            if old_work.position != new_work.position {
                events.push(EditorEvent::WorkMoved {
                    id,
                    new_pos: new_work.position,
                });
            }
            if old_work.duration != new_work.duration {
                events.push(EditorEvent::WorkPropsChanged { id });
            }
        }
        (EntityProps::Call(old_call), EntityProps::Call(new_call)) => {
            if old_call.position != new_call.position {
                events.push(EditorEvent::CallMoved {
                    id,
                    new_pos: new_call.position,
                });
            }
            if old_call.timeout_ms != new_call.timeout_ms || old_call.api_calls != new_call.api_calls
            {
                events.push(EditorEvent::CallPropsChanged { id });
            }
        }
        (old_props, new_props) if old_props != new_props => match new.entity_type() {
            EntityType::ApiDef => events.push(EditorEvent::ApiDefPropsChanged { id }),
            EntityType::System => events.push(EditorEvent::SystemPropsChanged { id }),
            _ => {}
        },
        _ => {}
    }
    events
}

fn reparent(
    store: &mut EntityStore,
    entity_id: EntityId,
    parent_id: EntityId,
    index: Option<usize>,
) -> Result<Applied, ApplyError> {
    let Some(entity) = store.entity(entity_id) else {
        return Err(ApplyError::EntityNotFound { entity_id });
    };
    if entity_id == parent_id || store.is_ancestor(entity_id, parent_id) {
        return Err(ApplyError::Cycle {
            entity_id,
            parent_id,
        });
    }
    let key = entity.key();
    let Some(old_parent_id) = entity.parent_id() else {
        return Err(ApplyError::InvalidParent {
            entity_type: key.entity_type,
            parent_type: None,
        });
    };
    check_parent(store, entity.entity_type(), Some(parent_id))?;

    let (_, old_index) = store
        .reparent(entity_id, parent_id, index)
        .ok_or(ApplyError::EntityNotFound { entity_id })?;
    Ok(Applied {
        inverse: Op::Reparent {
            entity_id,
            parent_id: old_parent_id,
            index: Some(old_index),
        },
        events: smallvec::smallvec![EditorEvent::EntityReparented { key, parent_id }],
    })
}

fn check_arrow(store: &EntityStore, arrow: &Arrow) -> Result<(), ApplyError> {
    let arrow_id = arrow.id();
    let endpoint_type = arrow.endpoint_kind().entity_type();
    for entity_id in [arrow.source_id(), arrow.target_id()] {
        if store.entity_of_type(entity_id, endpoint_type).is_none() {
            return Err(ApplyError::InvalidEndpoint { arrow_id, entity_id });
        }
    }
    if store
        .entity_of_type(arrow.flow_id(), EntityType::Flow)
        .is_none()
    {
        return Err(ApplyError::InvalidArrowFlow {
            arrow_id,
            flow_id: arrow.flow_id(),
        });
    }
    Ok(())
}

fn insert_arrow(
    store: &mut EntityStore,
    arrow: Arrow,
    index: Option<usize>,
) -> Result<Applied, ApplyError> {
    let arrow_id = arrow.id();
    if store.arrow(arrow_id).is_some() {
        return Err(ApplyError::ArrowExists { arrow_id });
    }
    check_arrow(store, &arrow)?;

    let flow_id = arrow.flow_id();
    store.insert_arrow(arrow, index);
    Ok(Applied {
        inverse: Op::RemoveArrow { arrow_id },
        events: smallvec::smallvec![EditorEvent::ArrowAdded { arrow_id, flow_id }],
    })
}

fn remove_arrow(store: &mut EntityStore, arrow_id: ArrowId) -> Result<Applied, ApplyError> {
    let (arrow, index) = store
        .remove_arrow(arrow_id)
        .ok_or(ApplyError::ArrowNotFound { arrow_id })?;
    Ok(Applied {
        inverse: Op::InsertArrow {
            arrow,
            index: Some(index),
        },
        events: smallvec::smallvec![EditorEvent::ArrowRemoved { arrow_id }],
    })
}

fn update_arrow(store: &mut EntityStore, arrow: Arrow) -> Result<Applied, ApplyError> {
    let arrow_id = arrow.id();
    if store.arrow(arrow_id).is_none() {
        return Err(ApplyError::ArrowNotFound { arrow_id });
    }
    check_arrow(store, &arrow)?;

    let old = store
        .replace_arrow(arrow)
        .ok_or(ApplyError::ArrowNotFound { arrow_id })?;
    Ok(Applied {
        inverse: Op::UpdateArrow { arrow: old },
        events: smallvec::smallvec![EditorEvent::ArrowUpdated { arrow_id }],
    })
}
