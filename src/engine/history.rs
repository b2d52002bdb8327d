// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::VecDeque;

use smol_str::SmolStr;

use crate::ops::Op;

/// One undoable unit: the ops that revert it, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HistoryEntry {
    pub label: SmolStr,
    pub ops: Vec<Op>,
}

/// Bounded undo stack plus the redo stack populated by undo.
#[derive(Debug, Clone)]
pub(crate) struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Records a freshly executed command. Clears redo; evicts the oldest entries past the bound.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        self.push_undo(entry);
    }

    /// Pushes onto the undo stack without touching redo (used by redo itself).
    pub fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo_stack.push(entry);
    }

    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo_stack.pop_back()
    }

    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo_stack.pop()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo labels, most recent first.
    pub fn undo_labels(&self) -> Vec<SmolStr> {
        self.undo_stack
            .iter()
            .rev()
            .map(|entry| entry.label.clone())
            .collect()
    }

    /// Redo labels, next to be redone first.
    pub fn redo_labels(&self) -> Vec<SmolStr> {
        self.redo_stack
            .iter()
            .rev()
            .map(|entry| entry.label.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{History, HistoryEntry};

    fn entry(label: &str) -> HistoryEntry {
        HistoryEntry {
            label: label.into(),
            ops: Vec::new(),
        }
    }

    #[test]
    fn record_evicts_oldest_past_bound() {
        let mut history = History::new(2);
        history.record(entry("a"));
        history.record(entry("b"));
        history.record(entry("c"));
        assert_eq!(history.undo_labels(), vec!["c", "b"]);
    }

    #[test]
    fn record_clears_redo() {
        let mut history = History::new(10);
        history.record(entry("a"));
        let undone = history.pop_undo().expect("undo");
        history.push_redo(undone);
        assert_eq!(history.redo_labels(), vec!["a"]);

        history.record(entry("b"));
        assert_eq!(history.redo_len(), 0);
    }
}
