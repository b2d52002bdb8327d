// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use glam::DVec2;
use rstest::{fixture, rstest};

use super::{HistoryView, Session, APP_TITLE};
use crate::config::EditorConfig;
use crate::engine::Command;
use crate::interaction::{FixedArrowType, Key, PointerEvent};
use crate::model::fixtures::{sample_project, SampleProject};
use crate::model::{ArrowType, EntityType, SelectionKey, Xywh};
use crate::projection::{TabKind, TreePane};
use crate::selection::Modifiers;

struct SessionTestCtx {
    session: Session,
    sample: SampleProject,
}

impl SessionTestCtx {
    fn key(&self, id: crate::model::EntityId, entity_type: EntityType) -> SelectionKey {
        SelectionKey::new(id, entity_type)
    }

    fn work(&self, id: crate::model::EntityId) -> SelectionKey {
        self.key(id, EntityType::Work)
    }

    fn open_flow(&mut self) {
        assert!(self.session.open_canvas_tab(self.sample.flow));
    }
}

#[fixture]
fn ctx() -> SessionTestCtx {
    let sample = sample_project();
    SessionTestCtx {
        session: Session::with_store(sample.store.clone(), EditorConfig::default()),
        sample,
    }
}

#[rstest]
fn fresh_session_has_clean_title_and_history(ctx: SessionTestCtx) {
    assert_eq!(ctx.session.title().get(), APP_TITLE);
    assert_eq!(
        ctx.session.history().get(),
        &HistoryView {
            items: vec!["(initial)".into()],
            current: 0,
        }
    );
    assert!(!ctx.session.can_undo());
    assert!(ctx.session.tabs().is_empty());
    assert!(ctx.session.canvas().nodes().is_empty());
}

#[rstest]
fn command_marks_dirty_and_updates_history(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    assert!(ctx.session.add_work("Inspect"));
    assert_eq!(ctx.session.title().get(), "Procflow *");
    assert_eq!(ctx.session.history().get().items.len(), 2);
    assert_eq!(ctx.session.history().get().current, 1);
    assert_eq!(ctx.session.canvas().nodes().len(), 4);

    assert!(ctx.session.undo());
    assert_eq!(ctx.session.canvas().nodes().len(), 3);
    assert!(ctx.session.can_redo());
    assert_eq!(ctx.session.history().get().current, 0);
}

#[rstest]
fn removed_selection_is_pruned_on_rebuild(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    let (load, press) = (ctx.work(ctx.sample.work_load), ctx.work(ctx.sample.work_press));
    ctx.session.tree_click(Some(load), Modifiers::NONE);
    ctx.session.tree_click(Some(press), Modifiers::CTRL);
    assert_eq!(ctx.session.selection().nodes(), &[load, press]);

    assert!(ctx.session.execute(Command::RemoveEntities {
        ids: vec![ctx.sample.work_load],
    }));
    assert_eq!(ctx.session.selection().nodes(), &[press]);
    assert_eq!(ctx.session.selection().anchor(), Some(press));
    assert!(ctx.session.tree().find(load).is_none());
    let press_node = ctx.session.canvas().node(ctx.sample.work_press).expect("press");
    assert_eq!(press_node.selection_order, 1);
}

#[rstest]
fn added_entity_is_expanded_into_view(mut ctx: SessionTestCtx) {
    ctx.session
        .tree_click(Some(ctx.key(ctx.sample.flow, EntityType::Flow)), Modifiers::NONE);
    assert!(ctx.session.add_work("Inspect"));

    let flow_key = ctx.key(ctx.sample.flow, EntityType::Flow);
    let system_key = ctx.key(ctx.sample.system, EntityType::System);
    assert!(ctx.session.tree().is_expanded(flow_key));
    assert!(ctx.session.tree().is_expanded(system_key));
    let visible = ctx.session.tree().visible_keys(TreePane::Control);
    let added = ctx
        .session
        .store()
        .children(ctx.sample.flow)
        .last()
        .copied()
        .expect("new work");
    assert!(visible.contains(&ctx.work(added)));
}

#[rstest]
fn rename_patches_views_in_place(mut ctx: SessionTestCtx) {
    assert!(ctx.session.open_canvas_tab(ctx.sample.work_load));
    assert_eq!(ctx.session.active_tab().map(|tab| tab.title.as_str()), Some("Assembly.Load"));

    ctx.session
        .tree_click(Some(ctx.key(ctx.sample.flow, EntityType::Flow)), Modifiers::NONE);
    assert!(ctx.session.rename_selected("Line A"));

    assert_eq!(ctx.session.active_tab().map(|tab| tab.title.as_str()), Some("Line A.Load"));
    let node = ctx
        .session
        .tree()
        .find(ctx.key(ctx.sample.flow, EntityType::Flow))
        .expect("flow node");
    assert_eq!(node.name, "Line A");
}

#[rstest]
fn empty_rename_only_warns(mut ctx: SessionTestCtx) {
    ctx.session
        .tree_click(Some(ctx.work(ctx.sample.work_load)), Modifiers::NONE);
    assert!(!ctx.session.rename_selected("   "));
    assert!(ctx.session.status().get().starts_with("[WARN]"));
    assert!(!ctx.session.is_dirty());
    assert_eq!(ctx.session.selection().nodes().len(), 1);
}

#[rstest]
fn structural_failure_reports_and_resyncs(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    assert!(!ctx.session.execute(Command::RenameEntity {
        id: crate::model::EntityId::new(),
        new_name: "Ghost".into(),
    }));
    assert_eq!(ctx.session.status().get(), "[ERROR] Event processing failed. See log.");
    assert_eq!(ctx.session.canvas().nodes().len(), 3);
}

#[rstest]
fn activating_a_tab_clears_selection(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    ctx.session
        .tree_click(Some(ctx.work(ctx.sample.work_load)), Modifiers::NONE);
    assert!(ctx.session.open_canvas_tab(ctx.sample.other_flow));
    assert!(ctx.session.selection().is_empty());
    assert_eq!(ctx.session.tabs().len(), 2);

    // Opening an already open canvas focuses it instead of duplicating.
    assert!(ctx.session.open_canvas_tab(ctx.sample.flow));
    assert_eq!(ctx.session.tabs().len(), 2);
    assert_eq!(ctx.session.active_tab_index(), Some(0));
}

#[rstest]
fn closing_tabs_picks_a_neighbour(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    ctx.session.open_canvas_tab(ctx.sample.other_flow);
    ctx.session.open_canvas_tab(ctx.sample.work_load);
    assert_eq!(ctx.session.active_tab_index(), Some(2));

    assert!(ctx.session.close_tab(2));
    assert_eq!(ctx.session.active_tab_index(), Some(1));
    assert_eq!(ctx.session.active_tab().map(|tab| tab.kind), Some(TabKind::Flow));

    assert!(ctx.session.close_tab(0));
    assert_eq!(ctx.session.active_tab_index(), Some(0));
    assert_eq!(ctx.session.active_tab().map(|tab| tab.root_id), Some(ctx.sample.other_flow));

    ctx.session.close_all_tabs();
    assert!(ctx.session.active_tab().is_none());
    assert!(ctx.session.canvas().nodes().is_empty());
}

#[rstest]
fn deleting_a_tab_root_drops_the_tab(mut ctx: SessionTestCtx) {
    ctx.session.open_canvas_tab(ctx.sample.system);
    ctx.session.open_canvas_tab(ctx.sample.other_flow);
    assert!(ctx.session.execute(Command::RemoveEntities {
        ids: vec![ctx.sample.other_flow],
    }));
    assert_eq!(ctx.session.tabs().len(), 1);
    assert_eq!(ctx.session.active_tab_index(), Some(0));
    assert_eq!(ctx.session.active_tab().map(|tab| tab.kind), Some(TabKind::System));
}

#[rstest]
fn canvas_drag_moves_node_in_place(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    ctx.session.pointer_down(PointerEvent::left(10.0, 10.0));
    ctx.session.pointer_move(DVec2::new(30.0, 40.0));
    ctx.session.pointer_up(PointerEvent::left(30.0, 40.0));

    let node = ctx.session.canvas().node(ctx.sample.work_load).expect("load");
    assert_eq!(node.rect.min, DVec2::new(20.0, 30.0));
    let stored = ctx
        .session
        .store()
        .entity(ctx.sample.work_load)
        .and_then(|entity| entity.position());
    assert_eq!(stored, Some(Xywh::new(20, 30, 120, 40)));
    assert_eq!(ctx.session.engine().undo_labels(), vec!["Move 1 node(s)"]);
}

#[rstest]
fn project_rename_reaches_the_device_tree(mut ctx: SessionTestCtx) {
    assert!(ctx.session.execute(Command::RenameEntity {
        id: ctx.sample.project,
        new_name: "Plant".into(),
    }));
    let control = ctx.session.tree().roots(TreePane::Control);
    assert_eq!(control[0].name, "Plant");
    let device = ctx.session.tree().roots(TreePane::Device);
    assert_eq!(device[0].key.entity_type, EntityType::DeviceRoot);
    assert_eq!(device[0].name, "Plant");
}

#[rstest]
fn sub_unit_drag_snaps_canvas_back_to_stored_rect(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    ctx.session.pointer_down(PointerEvent::left(10.0, 10.0));
    ctx.session.pointer_move(DVec2::new(10.5, 10.0));
    ctx.session.pointer_up(PointerEvent::left(10.5, 10.0));

    let node = ctx.session.canvas().node(ctx.sample.work_load).expect("load");
    assert_eq!(node.rect.min, DVec2::ZERO);
    let stored = ctx
        .session
        .store()
        .entity(ctx.sample.work_load)
        .and_then(|entity| entity.position());
    assert_eq!(stored, Some(Xywh::new(0, 0, 120, 40)));
    assert!(ctx.session.engine().undo_labels().is_empty());
    assert!(!ctx.session.is_dirty());
}

#[rstest]
fn canvas_connect_and_delete_arrow(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    ctx.session.pointer_down(PointerEvent::left(210.0, 10.0));
    ctx.session.pointer_up(PointerEvent::left(210.0, 10.0));
    let mut prompt = FixedArrowType(Some(ArrowType::Reset));
    ctx.session.start_connect(&mut prompt);
    ctx.session.pointer_down(PointerEvent::left(60.0, 140.0));

    assert_eq!(ctx.session.canvas().arrows().len(), 2);
    let added = ctx
        .session
        .canvas()
        .arrows()
        .iter()
        .find(|arrow| arrow.source_id == ctx.sample.work_press)
        .map(|arrow| arrow.id)
        .expect("new arrow");

    ctx.session.pointer_down(PointerEvent::left(160.0, 20.0));
    ctx.session.pointer_up(PointerEvent::left(160.0, 20.0));
    assert_eq!(ctx.session.selection().arrows().len(), 1);
    assert!(ctx.session.key_down(Key::Delete));
    assert_eq!(ctx.session.canvas().arrows().len(), 1);
    assert!(ctx.session.selection().arrows().is_empty());
    assert_eq!(ctx.session.canvas().arrows()[0].id, added);
}

#[rstest]
fn copy_paste_duplicates_siblings(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    ctx.session
        .tree_click(Some(ctx.work(ctx.sample.work_load)), Modifiers::NONE);
    ctx.session
        .tree_click(Some(ctx.work(ctx.sample.work_press)), Modifiers::CTRL);
    assert!(ctx.session.copy_selection());
    assert_eq!(ctx.session.status().get(), "Copied 2 item(s)");

    assert!(ctx.session.paste());
    assert_eq!(ctx.session.store().children(ctx.sample.flow).len(), 5);
    assert_eq!(ctx.session.canvas().nodes().len(), 5);
}

#[rstest]
fn copy_rejects_mixed_parents(mut ctx: SessionTestCtx) {
    ctx.session
        .tree_click(Some(ctx.work(ctx.sample.work_load)), Modifiers::NONE);
    ctx.session
        .tree_click(Some(ctx.work(ctx.sample.work_wrap)), Modifiers::CTRL);
    assert!(!ctx.session.copy_selection());
    assert!(ctx.session.clipboard().is_empty());
}

#[rstest]
fn search_reveals_the_hit(mut ctx: SessionTestCtx) {
    let hits = ctx.session.search("pick");
    let hit = hits.first().expect("hit");
    assert_eq!(hit.key, ctx.key(ctx.sample.api_def, EntityType::ApiDef));

    assert!(ctx.session.reveal(hit.key));
    assert_eq!(ctx.session.active_pane(), TreePane::Device);
    assert_eq!(ctx.session.selection().nodes(), &[hit.key]);
    let visible = ctx.session.tree().visible_keys(TreePane::Device);
    assert!(visible.contains(&hit.key));
}

#[rstest]
fn shift_click_in_tree_uses_visible_order(mut ctx: SessionTestCtx) {
    let flow_key = ctx.key(ctx.sample.flow, EntityType::Flow);
    ctx.session.reveal(ctx.work(ctx.sample.work_load));
    ctx.session.set_expanded(flow_key, true);
    ctx.session
        .tree_click(Some(ctx.work(ctx.sample.work_load)), Modifiers::NONE);
    ctx.session
        .tree_click(Some(ctx.work(ctx.sample.work_unload)), Modifiers::SHIFT);
    assert_eq!(
        ctx.session.selection().nodes(),
        &[
            ctx.work(ctx.sample.work_load),
            ctx.work(ctx.sample.work_press),
            ctx.work(ctx.sample.work_unload),
        ]
    );
}

#[rstest]
fn save_load_round_trip_updates_title(mut ctx: SessionTestCtx) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("line.json");
    ctx.open_flow();
    ctx.session.add_work("Inspect");

    assert!(ctx.session.save_as(&path));
    assert_eq!(ctx.session.title().get(), "Procflow - line.json");
    assert!(!ctx.session.is_dirty());

    let mut reopened = Session::open(&path, EditorConfig::default()).expect("open");
    assert_eq!(reopened.store(), ctx.session.store());
    assert_eq!(reopened.title().get(), "Procflow - line.json");

    reopened.new_document();
    assert!(reopened.store().is_empty());
    assert!(reopened.document().is_none());
    assert!(reopened.load(&path));
    assert_eq!(reopened.store(), ctx.session.store());
    assert!(!reopened.can_undo());
}

#[rstest]
fn load_failure_keeps_the_document(mut ctx: SessionTestCtx) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let before = ctx.session.store().clone();
    assert!(!ctx.session.load(tmp.path().join("absent.json")));
    assert!(ctx.session.status().get().starts_with("[ERROR] Load failed"));
    assert_eq!(ctx.session.store(), &before);
}

#[rstest]
fn history_jump_moves_both_ways(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    ctx.session.add_work("A");
    ctx.session.add_work("B");
    ctx.session.add_work("C");
    assert!(ctx.session.jump_to_history(1));
    assert_eq!(ctx.session.history().get().current, 1);
    assert_eq!(ctx.session.canvas().nodes().len(), 4);
    assert!(ctx.session.jump_to_history(3));
    assert_eq!(ctx.session.canvas().nodes().len(), 6);
}

#[rstest]
fn new_document_detaches_old_engine(mut ctx: SessionTestCtx) {
    ctx.open_flow();
    ctx.session.new_document();
    assert!(ctx.session.tabs().is_empty());
    assert!(!ctx.session.can_undo());
    assert!(ctx.session.add_project("Fresh"));
    assert_eq!(ctx.session.tree().roots(TreePane::Control).len(), 1);
}
