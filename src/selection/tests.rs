// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use glam::DVec2;
use rstest::{fixture, rstest};

use super::{canvas_order, Modifiers, SelectionCandidate, SelectionEngine};
use crate::geometry::Rect;
use crate::model::{ArrowId, EntityId, EntityType, SelectionKey};

struct SelectionTestCtx {
    engine: SelectionEngine,
    keys: Vec<SelectionKey>,
}

impl SelectionTestCtx {
    fn key(&self, index: usize) -> SelectionKey {
        self.keys[index]
    }
}

/// Five Work keys `A..E` and an empty selection.
#[fixture]
fn ctx() -> SelectionTestCtx {
    SelectionTestCtx {
        engine: SelectionEngine::new(),
        keys: (0..5)
            .map(|_| SelectionKey::new(EntityId::new(), EntityType::Work))
            .collect(),
    }
}

fn candidate(key: SelectionKey, x: f64, y: f64) -> SelectionCandidate {
    SelectionCandidate {
        key,
        rect: Rect::new(x, y, 20.0, 20.0),
    }
}

#[rstest]
fn plain_click_replaces_selection_and_sets_anchor(mut ctx: SelectionTestCtx) {
    let (a, b) = (ctx.key(0), ctx.key(1));
    ctx.engine.click(Some(a), Modifiers::NONE, &ctx.keys);
    ctx.engine.click(Some(b), Modifiers::NONE, &ctx.keys);
    assert_eq!(ctx.engine.nodes(), &[b]);
    assert_eq!(ctx.engine.anchor(), Some(b));
}

#[rstest]
fn ctrl_clicks_keep_click_order(mut ctx: SelectionTestCtx) {
    let (k1, k2, k3) = (ctx.key(3), ctx.key(0), ctx.key(2));
    for key in [k1, k2, k3] {
        ctx.engine.click(Some(key), Modifiers::CTRL, &ctx.keys);
    }
    assert_eq!(ctx.engine.nodes(), &[k1, k2, k3]);
    assert_eq!(ctx.engine.selection_order(k1), Some(1));
    assert_eq!(ctx.engine.selection_order(k2), Some(2));
    assert_eq!(ctx.engine.selection_order(k3), Some(3));
    assert_eq!(ctx.engine.primary(), Some(k3));
}

#[rstest]
fn ctrl_click_toggles_off_without_reordering(mut ctx: SelectionTestCtx) {
    let (a, b, c) = (ctx.key(0), ctx.key(1), ctx.key(2));
    for key in [a, b, c] {
        ctx.engine.click(Some(key), Modifiers::CTRL, &ctx.keys);
    }
    ctx.engine.click(Some(b), Modifiers::CTRL, &ctx.keys);
    assert_eq!(ctx.engine.nodes(), &[a, c]);
    assert_eq!(ctx.engine.anchor(), Some(b));

    ctx.engine.click(Some(a), Modifiers::CTRL, &ctx.keys);
    ctx.engine.click(Some(c), Modifiers::CTRL, &ctx.keys);
    assert!(ctx.engine.nodes().is_empty());
    assert_eq!(ctx.engine.anchor(), None);
}

#[rstest]
fn shift_click_selects_range_from_anchor(mut ctx: SelectionTestCtx) {
    let (a, d) = (ctx.key(0), ctx.key(3));
    ctx.engine.click(Some(a), Modifiers::NONE, &ctx.keys);
    ctx.engine.click(Some(d), Modifiers::SHIFT, &ctx.keys);
    assert_eq!(ctx.engine.nodes(), &ctx.keys[0..4]);
    assert_eq!(ctx.engine.anchor(), Some(a));

    // Anchor stays put, so a second shift-click re-ranges from A.
    let b = ctx.key(1);
    ctx.engine.click(Some(b), Modifiers::SHIFT, &ctx.keys);
    assert_eq!(ctx.engine.nodes(), &ctx.keys[0..2]);
}

#[rstest]
fn shift_range_backwards_keeps_total_order(mut ctx: SelectionTestCtx) {
    let (b, d) = (ctx.key(1), ctx.key(3));
    ctx.engine.click(Some(d), Modifiers::NONE, &ctx.keys);
    ctx.engine.click(Some(b), Modifiers::SHIFT, &ctx.keys);
    assert_eq!(ctx.engine.nodes(), &ctx.keys[1..4]);
}

#[rstest]
fn ctrl_shift_unions_the_range(mut ctx: SelectionTestCtx) {
    let (a, c, e) = (ctx.key(0), ctx.key(2), ctx.key(4));
    ctx.engine.click(Some(e), Modifiers::NONE, &ctx.keys);
    ctx.engine.click(Some(a), Modifiers::CTRL, &ctx.keys);
    let both = Modifiers {
        ctrl: true,
        shift: true,
    };
    ctx.engine.click(Some(c), both, &ctx.keys);
    assert_eq!(ctx.engine.nodes(), &[e, a, ctx.key(1), c]);
}

#[rstest]
fn shift_without_anchor_acts_as_plain_click(mut ctx: SelectionTestCtx) {
    let c = ctx.key(2);
    ctx.engine.click(Some(c), Modifiers::SHIFT, &ctx.keys);
    assert_eq!(ctx.engine.nodes(), &[c]);
    assert_eq!(ctx.engine.anchor(), Some(c));
}

#[rstest]
fn click_on_nothing_clears_unless_ctrl(mut ctx: SelectionTestCtx) {
    let a = ctx.key(0);
    ctx.engine.click(Some(a), Modifiers::NONE, &ctx.keys);
    ctx.engine.click(None, Modifiers::CTRL, &ctx.keys);
    assert_eq!(ctx.engine.nodes(), &[a]);
    ctx.engine.click(None, Modifiers::NONE, &ctx.keys);
    assert!(ctx.engine.nodes().is_empty());
}

#[rstest]
fn box_select_orders_by_y_then_x(mut ctx: SelectionTestCtx) {
    let (low, top, mid) = (ctx.key(0), ctx.key(1), ctx.key(2));
    let candidates = [
        candidate(low, 0.0, 50.0),
        candidate(top, 0.0, 0.0),
        candidate(mid, 50.0, 25.0),
        candidate(ctx.key(3), 500.0, 500.0),
    ];
    // Corners given bottom-right first; the box does not care.
    let rect = Rect::from_corners(DVec2::new(100.0, 100.0), DVec2::new(-5.0, -5.0));
    assert!(ctx.engine.select_box(rect, &candidates, false, 3.0));
    assert_eq!(ctx.engine.nodes(), &[top, mid, low]);
    assert_eq!(ctx.engine.anchor(), Some(low));
}

#[rstest]
fn box_select_additive_appends(mut ctx: SelectionTestCtx) {
    let (a, b) = (ctx.key(0), ctx.key(1));
    ctx.engine.click(Some(a), Modifiers::NONE, &ctx.keys);
    let candidates = [candidate(a, 0.0, 0.0), candidate(b, 100.0, 0.0)];
    let rect = Rect::from_corners(DVec2::new(90.0, -5.0), DVec2::new(130.0, 30.0));
    ctx.engine.select_box(rect, &candidates, true, 3.0);
    assert_eq!(ctx.engine.nodes(), &[a, b]);
}

#[rstest]
fn tiny_box_is_a_click_on_empty_space(mut ctx: SelectionTestCtx) {
    let a = ctx.key(0);
    ctx.engine.click(Some(a), Modifiers::NONE, &ctx.keys);
    let candidates = [candidate(a, 0.0, 0.0)];
    let tiny = Rect::from_corners(DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0));

    assert!(!ctx.engine.select_box(tiny, &candidates, true, 3.0));
    assert_eq!(ctx.engine.nodes(), &[a]);
    assert!(!ctx.engine.select_box(tiny, &candidates, false, 3.0));
    assert!(ctx.engine.nodes().is_empty());
}

#[rstest]
fn node_and_arrow_selection_are_exclusive(mut ctx: SelectionTestCtx) {
    let a = ctx.key(0);
    let arrow = ArrowId::new();
    ctx.engine.click(Some(a), Modifiers::NONE, &ctx.keys);
    ctx.engine.select_arrow(arrow, false);
    assert!(ctx.engine.nodes().is_empty());
    assert_eq!(ctx.engine.arrows(), &[arrow]);

    ctx.engine.select_arrow(arrow, true);
    assert!(ctx.engine.arrows().is_empty());

    ctx.engine.select_arrow(arrow, false);
    ctx.engine.click(Some(a), Modifiers::NONE, &ctx.keys);
    assert!(ctx.engine.arrows().is_empty());
}

#[rstest]
fn prune_drops_dead_keys(mut ctx: SelectionTestCtx) {
    let (a, b, c) = (ctx.key(0), ctx.key(1), ctx.key(2));
    for key in [a, b, c] {
        ctx.engine.click(Some(key), Modifiers::CTRL, &ctx.keys);
    }
    ctx.engine.prune(|key| key != c, |_| true);
    assert_eq!(ctx.engine.nodes(), &[a, b]);
    assert_eq!(ctx.engine.anchor(), Some(b));
}

#[test]
fn canvas_order_breaks_ties_by_id() {
    let mut ids = [EntityId::new(), EntityId::new()];
    ids.sort();
    let first = SelectionKey::new(ids[0], EntityType::Call);
    let second = SelectionKey::new(ids[1], EntityType::Call);
    let order = canvas_order(&[candidate(second, 10.0, 10.0), candidate(first, 10.0, 10.0)]);
    assert_eq!(order, vec![first, second]);
}
