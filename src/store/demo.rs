// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::config::EditorConfig;
use crate::engine::{Command, EditorError, Engine};
use crate::model::{ArrowType, EntityId, EntityStore, EntityType, Xywh};

/// A small assembly line: one active system with two flows, a passive robot exposing two
/// ApiDefs, and a few arrows. Built through ordinary commands.
pub fn demo_store(config: &EditorConfig) -> Result<EntityStore, EditorError> {
    let mut engine = Engine::new(config.clone());
    let project = add(&mut engine, Command::AddProject { name: "Demo".into() })?;
    let line = add(
        &mut engine,
        Command::AddSystem {
            project_id: project,
            name: "Line".into(),
            is_active: true,
        },
    )?;
    let robot = add(
        &mut engine,
        Command::AddSystem {
            project_id: project,
            name: "Robot".into(),
            is_active: false,
        },
    )?;
    let pick = add(
        &mut engine,
        Command::AddApiDef {
            system_id: robot,
            name: "Pick".into(),
        },
    )?;
    add(
        &mut engine,
        Command::AddApiDef {
            system_id: robot,
            name: "Place".into(),
        },
    )?;
    add(
        &mut engine,
        Command::AddHwComponent {
            system_id: line,
            kind: EntityType::Button,
            name: "Start".into(),
        },
    )?;
    add(
        &mut engine,
        Command::AddHwComponent {
            system_id: line,
            kind: EntityType::Lamp,
            name: "Running".into(),
        },
    )?;

    let assembly = add(
        &mut engine,
        Command::AddFlow {
            system_id: line,
            name: "Assembly".into(),
        },
    )?;
    let mut works = Vec::new();
    for (index, name) in ["Load", "Press", "Unload"].into_iter().enumerate() {
        let x = 50 + 200 * index as i32;
        works.push(add(
            &mut engine,
            Command::AddWork {
                flow_id: assembly,
                name: name.into(),
                position: Some(Xywh::new(x, 50, 120, 40)),
            },
        )?);
    }
    engine.execute(Command::ConnectInOrder {
        ordered: works.clone(),
        arrow_type: ArrowType::Start,
    })?;
    engine.execute(Command::UpdateWorkDuration {
        work_id: works[1],
        text: "00:00:05".to_owned(),
    })?;

    let grip = add(
        &mut engine,
        Command::AddCall {
            work_id: works[0],
            name: "Grip".into(),
            position: Some(Xywh::new(50, 50, 120, 40)),
            api_def_ids: vec![pick],
        },
    )?;
    let lift = add(
        &mut engine,
        Command::AddCall {
            work_id: works[0],
            name: "Lift".into(),
            position: None,
            api_def_ids: Vec::new(),
        },
    )?;
    engine.execute(Command::AddArrow {
        source_id: grip,
        target_id: lift,
        arrow_type: ArrowType::Start,
    })?;

    let packing = add(
        &mut engine,
        Command::AddFlow {
            system_id: line,
            name: "Packing".into(),
        },
    )?;
    add(
        &mut engine,
        Command::AddWork {
            flow_id: packing,
            name: "Wrap".into(),
            position: None,
        },
    )?;

    Ok(engine.store().clone())
}

/// Runs an add command and returns the id of the entity it appended.
fn add(engine: &mut Engine, command: Command) -> Result<EntityId, EditorError> {
    let parent_id = match &command {
        Command::AddSystem { project_id, .. } => Some(*project_id),
        Command::AddFlow { system_id, .. }
        | Command::AddApiDef { system_id, .. }
        | Command::AddHwComponent { system_id, .. } => Some(*system_id),
        Command::AddWork { flow_id, .. } => Some(*flow_id),
        Command::AddCall { work_id, .. } => Some(*work_id),
        _ => None,
    };
    engine.execute(command)?;
    let store = engine.store();
    let siblings = match parent_id {
        Some(parent_id) => store.children(parent_id),
        None => store.roots(),
    };
    siblings
        .last()
        .copied()
        .ok_or_else(|| EditorError::EntityNotFound(parent_id.unwrap_or_default()))
}
