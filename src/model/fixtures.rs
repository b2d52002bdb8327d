// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::arrow::{Arrow, ArrowType, EndpointKind};
use super::entity::{Entity, EntityProps, EntityType, Xywh};
use super::ids::{ArrowId, EntityId};
use super::store::EntityStore;

/// A small but complete project used across unit tests.
///
/// ```text
/// Project
/// ├── Line (active system)
/// │   ├── Assembly (flow): Load@(0,0) ─Start→ Press@(200,0), Unload (unplaced)
/// │   │   └── Load: Grip@(0,0) ─Start→ Lift@(200,0)
/// │   └── Packing (flow): Wrap@(0,100)
/// └── Robot (passive system)
///     └── Pick (api def)
/// ```
pub(crate) struct SampleProject {
    pub store: EntityStore,
    pub project: EntityId,
    pub system: EntityId,
    pub device_system: EntityId,
    pub flow: EntityId,
    pub other_flow: EntityId,
    pub work_load: EntityId,
    pub work_press: EntityId,
    pub work_unload: EntityId,
    pub work_wrap: EntityId,
    pub call_grip: EntityId,
    pub call_lift: EntityId,
    pub api_def: EntityId,
    pub work_arrow: ArrowId,
    pub call_arrow: ArrowId,
}

fn add(
    store: &mut EntityStore,
    entity_type: EntityType,
    name: &str,
    parent_id: Option<EntityId>,
) -> EntityId {
    let entity = Entity::new(entity_type, name, parent_id);
    let id = entity.id();
    store.insert_entity(entity, None);
    id
}

fn add_node(
    store: &mut EntityStore,
    entity_type: EntityType,
    name: &str,
    parent_id: EntityId,
    position: Option<Xywh>,
) -> EntityId {
    let mut entity = Entity::new(entity_type, name, Some(parent_id));
    entity.set_position(position);
    let id = entity.id();
    store.insert_entity(entity, None);
    id
}

pub(crate) fn sample_project() -> SampleProject {
    let mut store = EntityStore::new();

    let project = add(&mut store, EntityType::Project, "Project", None);
    let system = add(&mut store, EntityType::System, "Line", Some(project));
    let flow = add(&mut store, EntityType::Flow, "Assembly", Some(system));
    let work_load = add_node(
        &mut store,
        EntityType::Work,
        "Load",
        flow,
        Some(Xywh::new(0, 0, 120, 40)),
    );
    let work_press = add_node(
        &mut store,
        EntityType::Work,
        "Press",
        flow,
        Some(Xywh::new(200, 0, 120, 40)),
    );
    let work_unload = add_node(&mut store, EntityType::Work, "Unload", flow, None);
    let call_grip = add_node(
        &mut store,
        EntityType::Call,
        "Grip",
        work_load,
        Some(Xywh::new(0, 0, 120, 40)),
    );
    let call_lift = add_node(
        &mut store,
        EntityType::Call,
        "Lift",
        work_load,
        Some(Xywh::new(200, 0, 120, 40)),
    );
    let other_flow = add(&mut store, EntityType::Flow, "Packing", Some(system));
    let work_wrap = add_node(
        &mut store,
        EntityType::Work,
        "Wrap",
        other_flow,
        Some(Xywh::new(0, 100, 120, 40)),
    );

    let device_system = Entity::new(EntityType::System, "Robot", Some(project));
    let device_system = {
        let mut entity = device_system;
        entity.set_props(EntityProps::System { is_active: false });
        let id = entity.id();
        store.insert_entity(entity, None);
        id
    };
    let api_def = add(&mut store, EntityType::ApiDef, "Pick", Some(device_system));

    let work_arrow = ArrowId::new();
    store.insert_arrow(
        Arrow::new(
            work_arrow,
            work_load,
            work_press,
            ArrowType::Start,
            flow,
            EndpointKind::Work,
        ),
        None,
    );
    let call_arrow = ArrowId::new();
    store.insert_arrow(
        Arrow::new(
            call_arrow,
            call_grip,
            call_lift,
            ArrowType::Start,
            flow,
            EndpointKind::Call,
        ),
        None,
    );

    SampleProject {
        store,
        project,
        system,
        device_system,
        flow,
        other_flow,
        work_load,
        work_press,
        work_unload,
        work_wrap,
        call_grip,
        call_lift,
        api_def,
        work_arrow,
        call_arrow,
    }
}
