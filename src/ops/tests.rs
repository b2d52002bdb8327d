// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::engine::EditorEvent;
use crate::model::fixtures::sample_project;
use crate::model::{Arrow, ArrowId, ArrowType, EndpointKind, Entity, EntityType, Xywh};

use super::{apply_op, apply_ops, ApplyError, Op, Transaction};

#[test]
fn insert_then_inverse_restores_store() {
    let sample = sample_project();
    let mut store = sample.store.clone();

    let work = Entity::new(EntityType::Work, "Inspect", Some(sample.flow));
    let work_id = work.id();
    let applied = apply_op(&mut store, Op::InsertEntity { entity: work, index: Some(0) })
        .expect("insert");

    assert_eq!(store.children(sample.flow)[0], work_id);
    assert_eq!(applied.inverse, Op::RemoveEntity { entity_id: work_id });
    assert!(matches!(
        applied.events.as_slice(),
        [EditorEvent::EntityAdded { key, parent_id: Some(parent) }]
            if key.id == work_id && *parent == sample.flow
    ));

    apply_op(&mut store, applied.inverse).expect("inverse");
    assert_eq!(store, sample.store);
}

#[test]
fn insert_rejects_wrong_parent_type() {
    let sample = sample_project();
    let mut store = sample.store.clone();

    let call = Entity::new(EntityType::Call, "Misplaced", Some(sample.flow));
    let err = apply_op(&mut store, Op::InsertEntity { entity: call, index: None })
        .expect_err("call under flow");
    assert_eq!(
        err,
        ApplyError::InvalidParent {
            entity_type: EntityType::Call,
            parent_type: Some(EntityType::Flow),
        }
    );
    assert_eq!(store, sample.store);
}

#[test]
fn insert_rejects_projection_only_types() {
    let sample = sample_project();
    let mut store = sample.store.clone();

    let category = Entity::new(EntityType::ApiDefCategory, "ApiDefs", None);
    let err = apply_op(&mut store, Op::InsertEntity { entity: category, index: None })
        .expect_err("projection-only");
    assert_eq!(err, ApplyError::NotStorable { entity_type: EntityType::ApiDefCategory });
}

#[test]
fn remove_requires_leaf_without_arrows() {
    let sample = sample_project();
    let mut store = sample.store.clone();

    let err = apply_op(&mut store, Op::RemoveEntity { entity_id: sample.work_load })
        .expect_err("has calls");
    assert_eq!(err, ApplyError::HasChildren { entity_id: sample.work_load });

    let err = apply_op(&mut store, Op::RemoveEntity { entity_id: sample.work_press })
        .expect_err("has arrow");
    assert_eq!(err, ApplyError::ArrowsAttached { entity_id: sample.work_press });

    let applied = apply_op(&mut store, Op::RemoveEntity { entity_id: sample.work_unload })
        .expect("remove leaf");
    assert!(!store.contains(sample.work_unload));
    assert!(matches!(applied.inverse, Op::InsertEntity { index: Some(2), .. }));
}

#[test]
fn update_reports_rename_and_move_separately() {
    let sample = sample_project();
    let mut store = sample.store.clone();

    let mut work = store.entity(sample.work_press).cloned().expect("work");
    work.set_name("Press 2");
    work.set_position(Some(Xywh::new(300, 40, 120, 40)));

    let applied = apply_op(&mut store, Op::UpdateEntity { entity: work }).expect("update");
    assert_eq!(applied.events.len(), 2);
    assert!(matches!(&applied.events[0], EditorEvent::EntityRenamed { new_name, .. } if new_name == "Press 2"));
    assert!(matches!(
        applied.events[1],
        EditorEvent::WorkMoved { id, new_pos: Some(pos) } if id == sample.work_press && pos.x == 300
    ));
}

#[test]
fn update_rejects_parent_change() {
    let sample = sample_project();
    let mut store = sample.store.clone();

    let mut work = store.entity(sample.work_press).cloned().expect("work");
    work.set_parent_id(Some(sample.other_flow));
    let err = apply_op(&mut store, Op::UpdateEntity { entity: work }).expect_err("parent");
    assert_eq!(err, ApplyError::IdentityChanged { entity_id: sample.work_press });
}

#[test]
fn reparent_rejects_cycles_and_restores_index() {
    let sample = sample_project();
    let mut store = sample.store.clone();

    let err = apply_op(
        &mut store,
        Op::Reparent { entity_id: sample.flow, parent_id: sample.flow, index: None },
    )
    .expect_err("self parent");
    assert!(matches!(err, ApplyError::Cycle { .. }));

    let applied = apply_op(
        &mut store,
        Op::Reparent { entity_id: sample.work_unload, parent_id: sample.other_flow, index: None },
    )
    .expect("reparent");
    assert_eq!(store.children(sample.other_flow), &[sample.work_wrap, sample.work_unload]);

    apply_op(&mut store, applied.inverse).expect("inverse");
    assert_eq!(store, sample.store);
}

#[test]
fn arrows_require_matching_endpoints() {
    let sample = sample_project();
    let mut store = sample.store.clone();

    let arrow_id = ArrowId::new();
    let mixed = Arrow::new(
        arrow_id,
        sample.work_load,
        sample.call_grip,
        ArrowType::Start,
        sample.flow,
        EndpointKind::Work,
    );
    let err = apply_op(&mut store, Op::InsertArrow { arrow: mixed, index: None })
        .expect_err("call endpoint on work arrow");
    assert_eq!(err, ApplyError::InvalidEndpoint { arrow_id, entity_id: sample.call_grip });
}

#[test]
fn apply_ops_is_atomic() {
    let sample = sample_project();
    let mut store = sample.store.clone();

    let ok = Entity::new(EntityType::Work, "Ok", Some(sample.flow));
    let result = apply_ops(
        &mut store,
        [
            Op::InsertEntity { entity: ok, index: None },
            Op::RemoveEntity { entity_id: sample.work_load },
        ],
    );
    assert!(result.is_err());
    assert_eq!(store, sample.store);
}

#[test]
fn transaction_inverse_replays_in_reverse() {
    let sample = sample_project();

    let mut tx = Transaction::new(&sample.store);
    tx.apply(Op::RemoveArrow { arrow_id: sample.work_arrow }).expect("remove arrow");
    tx.apply(Op::RemoveEntity { entity_id: sample.work_press }).expect("remove work");
    assert_eq!(tx.applied(), 2);
    let committed = tx.commit();
    assert_eq!(committed.events.len(), 2);

    let mut store = committed.store;
    apply_ops(&mut store, committed.inverse).expect("undo");
    assert_eq!(store, sample.store);
}
