// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Ordered multi-selection shared by the tree and the canvas.
//!
//! Node keys keep the order in which they were selected; that order is what
//! "connect in selection order" chains. Node and arrow selection are mutually exclusive.

use std::collections::HashMap;

use crate::geometry::Rect;
use crate::model::{ArrowId, SelectionKey};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
    };
    pub const SHIFT: Self = Self {
        ctrl: false,
        shift: true,
    };

    pub fn any(self) -> bool {
        self.ctrl || self.shift
    }
}

/// A canvas node offered to box selection and canvas range ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionCandidate {
    pub key: SelectionKey,
    pub rect: Rect,
}

/// Reproducible canvas order: ascending y, then x, then id.
pub fn canvas_order(candidates: &[SelectionCandidate]) -> Vec<SelectionKey> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| {
        a.rect
            .min
            .y
            .total_cmp(&b.rect.min.y)
            .then_with(|| a.rect.min.x.total_cmp(&b.rect.min.x))
            .then_with(|| a.key.cmp(&b.key))
    });
    sorted.into_iter().map(|candidate| candidate.key).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionEngine {
    nodes: Vec<SelectionKey>,
    arrows: Vec<ArrowId>,
    anchor: Option<SelectionKey>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[SelectionKey] {
        &self.nodes
    }

    pub fn arrows(&self) -> &[ArrowId] {
        &self.arrows
    }

    pub fn anchor(&self) -> Option<SelectionKey> {
        self.anchor
    }

    /// The most recently selected node.
    pub fn primary(&self) -> Option<SelectionKey> {
        self.nodes.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.arrows.is_empty()
    }

    pub fn is_selected(&self, key: SelectionKey) -> bool {
        self.nodes.contains(&key)
    }

    pub fn is_arrow_selected(&self, arrow_id: ArrowId) -> bool {
        self.arrows.contains(&arrow_id)
    }

    /// 1-based display order of a selected key.
    pub fn selection_order(&self, key: SelectionKey) -> Option<usize> {
        self.nodes
            .iter()
            .position(|selected| *selected == key)
            .map(|index| index + 1)
    }

    pub fn order_map(&self) -> HashMap<SelectionKey, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, key)| (*key, index + 1))
            .collect()
    }

    /// Applies a click on `target` (or on nothing).
    ///
    /// `total_order` is the caller's display order of candidates and drives shift ranges.
    /// Ctrl toggles membership. Shift selects the run between the anchor and the target and
    /// leaves the anchor in place; ctrl+shift adds that run to the current selection. Shift
    /// without a usable anchor behaves like a plain click.
    pub fn click(&mut self, target: Option<SelectionKey>, modifiers: Modifiers, total_order: &[SelectionKey]) {
        let Some(target) = target else {
            if !modifiers.ctrl {
                self.clear_nodes();
            }
            return;
        };
        self.arrows.clear();

        if modifiers.shift {
            if let Some(range) = self.range_to(target, total_order) {
                if !modifiers.ctrl {
                    self.nodes.clear();
                }
                for key in range {
                    if !self.nodes.contains(&key) {
                        self.nodes.push(key);
                    }
                }
                return;
            }
        }

        if modifiers.ctrl {
            if let Some(index) = self.nodes.iter().position(|key| *key == target) {
                self.nodes.remove(index);
                self.anchor = (!self.nodes.is_empty()).then_some(target);
            } else {
                self.nodes.push(target);
                self.anchor = Some(target);
            }
            return;
        }

        self.nodes.clear();
        self.nodes.push(target);
        self.anchor = Some(target);
    }

    fn range_to(&self, target: SelectionKey, total_order: &[SelectionKey]) -> Option<Vec<SelectionKey>> {
        let anchor = self.anchor?;
        let from = total_order.iter().position(|key| *key == anchor)?;
        let to = total_order.iter().position(|key| *key == target)?;
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        Some(total_order[lo..=hi].to_vec())
    }

    /// Rubber-band selection. `rect` spans the two drag corners.
    ///
    /// Returns `false` when the box was below the click threshold and treated as a click on
    /// empty space.
    pub fn select_box(
        &mut self,
        rect: Rect,
        candidates: &[SelectionCandidate],
        additive: bool,
        click_threshold: f64,
    ) -> bool {
        self.arrows.clear();
        if rect.width() < click_threshold && rect.height() < click_threshold {
            if !additive {
                self.clear_nodes();
            }
            return false;
        }

        let hits = candidates
            .iter()
            .filter(|candidate| rect.intersects(&candidate.rect))
            .copied()
            .collect::<Vec<_>>();
        if !additive {
            self.nodes.clear();
        }
        for key in canvas_order(&hits) {
            if !self.nodes.contains(&key) {
                self.nodes.push(key);
            }
        }
        self.anchor = self.nodes.last().copied();
        true
    }

    /// Replaces the node selection outright (tree search, programmatic selection).
    pub fn set_nodes(&mut self, keys: impl IntoIterator<Item = SelectionKey>) {
        self.nodes.clear();
        for key in keys {
            if !self.nodes.contains(&key) {
                self.nodes.push(key);
            }
        }
        self.anchor = self.nodes.last().copied();
        if !self.nodes.is_empty() {
            self.arrows.clear();
        }
    }

    /// Arrow click; ctrl toggles. Always clears the node selection.
    pub fn select_arrow(&mut self, arrow_id: ArrowId, ctrl: bool) {
        self.clear_nodes();
        if !ctrl {
            self.arrows.clear();
            self.arrows.push(arrow_id);
        } else if let Some(index) = self.arrows.iter().position(|id| *id == arrow_id) {
            self.arrows.remove(index);
        } else {
            self.arrows.push(arrow_id);
        }
    }

    pub fn clear_nodes(&mut self) {
        self.nodes.clear();
        self.anchor = None;
    }

    pub fn clear_arrows(&mut self) {
        self.arrows.clear();
    }

    pub fn clear(&mut self) {
        self.clear_nodes();
        self.clear_arrows();
    }

    /// Drops keys and arrows that no longer exist in any view. The anchor moves to the last
    /// surviving key.
    pub fn prune(
        &mut self,
        node_exists: impl Fn(SelectionKey) -> bool,
        arrow_exists: impl Fn(ArrowId) -> bool,
    ) {
        self.nodes.retain(|key| node_exists(*key));
        self.arrows.retain(|id| arrow_exists(*id));
        self.anchor = self.nodes.last().copied();
    }
}

#[cfg(test)]
mod tests;
