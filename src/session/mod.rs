// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The editing session: one document, its engine, and every view derived from it.
//!
//! All mutation and projection code runs on the session's owner. Engine events are queued on a
//! channel and applied by [`Session::pump_events`], which every mutating entry point calls before
//! returning. Failures never escape: they are logged, shown on the status line and, for faults,
//! followed by a full rebuild from the current store.

use std::path::PathBuf;

use glam::DVec2;
use log::{debug, error, warn};
use smol_str::SmolStr;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::EditorConfig;
use crate::engine::{queries, Command, EditorError, EditorEvent, Engine};
use crate::interaction::{
    delete_selection, ArrowTypePrompt, CanvasInteraction, ConnectStart, InteractionHost, Key,
    PointerEvent,
};
use crate::model::{EntityId, EntityStore, EntityType, SelectionKey};
use crate::observable::Observable;
use crate::projection::{search_tree, CanvasProjection, CanvasTab, SearchHit, TreePane, TreeProjection};
use crate::selection::{Modifiers, SelectionEngine};
use crate::store::{DocumentStore, StoreError};

pub const APP_TITLE: &str = "Procflow";

/// What the history panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryView {
    pub items: Vec<SmolStr>,
    /// Index into `items` of the current state.
    pub current: usize,
}

/// Refresh work collected while draining the event queue.
#[derive(Debug, Default)]
struct PendingRefresh {
    rebuild: bool,
    expand: Vec<EntityId>,
}

pub struct Session {
    config: EditorConfig,
    engine: Engine,
    events: UnboundedReceiver<EditorEvent>,
    document: Option<DocumentStore>,
    tree: TreeProjection,
    canvas: CanvasProjection,
    selection: SelectionEngine,
    interaction: CanvasInteraction,
    tabs: Vec<CanvasTab>,
    active_tab: Option<usize>,
    active_pane: TreePane,
    clipboard: Vec<EntityId>,
    status: Observable<String>,
    title: Observable<String>,
    history: Observable<HistoryView>,
    properties: Observable<()>,
}

impl Session {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_store(EntityStore::new(), config)
    }

    pub fn with_store(store: EntityStore, config: EditorConfig) -> Self {
        let mut engine = Engine::with_store(store, config.clone());
        let events = engine.subscribe();
        let mut session = Self {
            config,
            engine,
            events,
            document: None,
            tree: TreeProjection::new(),
            canvas: CanvasProjection::new(),
            selection: SelectionEngine::new(),
            interaction: CanvasInteraction::new(),
            tabs: Vec::new(),
            active_tab: None,
            active_pane: TreePane::default(),
            clipboard: Vec::new(),
            status: Observable::new(String::new()),
            title: Observable::new(APP_TITLE.to_owned()),
            history: Observable::default(),
            properties: Observable::default(),
        };
        session.rebuild_all();
        session
    }

    /// Opens a document from disk.
    pub fn open(path: impl Into<PathBuf>, config: EditorConfig) -> Result<Self, StoreError> {
        let document = DocumentStore::new(path);
        let store = document.load()?;
        let mut session = Self::with_store(store, config);
        session.document = Some(document);
        session.refresh_title();
        Ok(session)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn store(&self) -> &EntityStore {
        self.engine.store()
    }

    pub fn document(&self) -> Option<&DocumentStore> {
        self.document.as_ref()
    }

    pub fn tree(&self) -> &TreeProjection {
        &self.tree
    }

    pub fn canvas(&self) -> &CanvasProjection {
        &self.canvas
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn interaction(&self) -> &CanvasInteraction {
        &self.interaction
    }

    pub fn tabs(&self) -> &[CanvasTab] {
        &self.tabs
    }

    pub fn active_tab_index(&self) -> Option<usize> {
        self.active_tab
    }

    pub fn active_tab(&self) -> Option<&CanvasTab> {
        self.active_tab.and_then(|index| self.tabs.get(index))
    }

    pub fn active_pane(&self) -> TreePane {
        self.active_pane
    }

    pub fn set_active_pane(&mut self, pane: TreePane) {
        self.active_pane = pane;
    }

    pub fn status(&self) -> &Observable<String> {
        &self.status
    }

    pub fn title(&self) -> &Observable<String> {
        &self.title
    }

    pub fn history(&self) -> &Observable<HistoryView> {
        &self.history
    }

    /// Bumped whenever entity props change; property panels re-read on a new revision.
    pub fn properties(&self) -> &Observable<()> {
        &self.properties
    }

    pub fn is_dirty(&self) -> bool {
        self.engine.is_dirty()
    }

    pub fn can_undo(&self) -> bool {
        self.engine.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.engine.can_redo()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status.set(message.into());
    }

    // ---------------------------------------------------------------------------------------
    // Engine boundary
    // ---------------------------------------------------------------------------------------

    /// Executes `command` and applies the resulting events. Returns whether it was applied.
    pub fn execute(&mut self, command: Command) -> bool {
        let label = command.label();
        let result = self.engine.execute(command);
        self.settle(&label, result.map(|_| ()))
    }

    pub fn undo(&mut self) -> bool {
        let result = self.engine.undo();
        self.settle_bool("Undo", result)
    }

    pub fn redo(&mut self) -> bool {
        let result = self.engine.redo();
        self.settle_bool("Redo", result)
    }

    pub fn undo_to(&mut self, steps: usize) -> bool {
        let result = self.engine.undo_to(steps);
        self.settle_bool("Undo", result)
    }

    pub fn redo_to(&mut self, steps: usize) -> bool {
        let result = self.engine.redo_to(steps);
        self.settle_bool("Redo", result)
    }

    pub fn jump_to_history(&mut self, index: usize) -> bool {
        let result = self.engine.jump_to_history(index);
        self.settle_bool("History jump", result)
    }

    fn settle_bool(&mut self, label: &str, result: Result<bool, EditorError>) -> bool {
        match result {
            Ok(applied) => {
                self.pump_events();
                applied
            }
            Err(err) => self.settle(label, Err(err)),
        }
    }

    /// The single place engine failures are turned into status messages.
    fn settle(&mut self, label: &str, result: Result<(), EditorError>) -> bool {
        match result {
            Ok(()) => {
                self.pump_events();
                true
            }
            Err(err) if err.is_validation() => {
                warn!("{label} rejected: {err}");
                self.set_status(format!("[WARN] {err}"));
                self.pump_events();
                false
            }
            Err(err) => {
                error!("{label} failed: {err}");
                self.set_status("[ERROR] Event processing failed. See log.");
                self.pump_events();
                self.rebuild_all();
                false
            }
        }
    }

    // ---------------------------------------------------------------------------------------
    // Event application
    // ---------------------------------------------------------------------------------------

    /// Drains the engine's event queue and patches or rebuilds the projections.
    pub fn pump_events(&mut self) {
        let mut pending = PendingRefresh::default();
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event, &mut pending);
        }
        if pending.rebuild {
            self.rebuild_all();
        }
        for entity_id in pending.expand {
            self.tree.expand_node_and_ancestors(entity_id);
        }
        self.refresh_title();
    }

    fn apply_event(&mut self, event: EditorEvent, pending: &mut PendingRefresh) {
        match event {
            EditorEvent::EntityAdded { key, .. } => {
                pending.rebuild = true;
                pending.expand.push(key.id);
            }
            EditorEvent::EntityRenamed { key, new_name } => {
                self.tree.rename(key.id, &new_name);
                self.canvas.rename(key.id, &new_name);
                self.refresh_tab_titles();
            }
            EditorEvent::WorkMoved { id, new_pos } | EditorEvent::CallMoved { id, new_pos } => {
                self.canvas.apply_move(id, new_pos, &self.config);
            }
            EditorEvent::SystemPropsChanged { .. } => {
                // Active/passive decides which tree a system lives in.
                pending.rebuild = true;
                self.properties.touch();
            }
            EditorEvent::WorkPropsChanged { .. }
            | EditorEvent::CallPropsChanged { .. }
            | EditorEvent::ApiDefPropsChanged { .. } => self.properties.touch(),
            EditorEvent::ArrowAdded { .. }
            | EditorEvent::ArrowRemoved { .. }
            | EditorEvent::ArrowUpdated { .. } => self.refresh_canvas(),
            EditorEvent::HistoryChanged { .. } => self.refresh_history(),
            EditorEvent::Batch(events) => {
                for event in events {
                    self.apply_event(event, pending);
                }
            }
            other => {
                debug!("full rebuild for {other:?}");
                pending.rebuild = true;
            }
        }
    }

    /// Rebuilds every projection from the current store and restores what still exists of the
    /// selection, the expansion state and the open tabs.
    pub fn rebuild_all(&mut self) {
        let store = self.engine.snapshot();
        self.tree.rebuild(&store);

        let active_key = self.active_tab().map(CanvasTab::key);
        self.tabs
            .retain(|tab| queries::tab_exists(&store, tab.kind, tab.root_id));
        self.active_tab = match active_key {
            Some(key) => self
                .tabs
                .iter()
                .position(|tab| tab.key() == key)
                .or(if self.tabs.is_empty() { None } else { Some(0) }),
            None => None,
        };
        self.refresh_tab_titles();
        self.refresh_canvas();
        self.refresh_history();
    }

    fn refresh_canvas(&mut self) {
        let tab = self.active_tab().map(CanvasTab::key);
        self.canvas.rebuild(self.engine.store(), tab, &self.config);
        self.restore_selection();
    }

    /// Keeps selected keys that are still visible somewhere and re-applies selection flags.
    fn restore_selection(&mut self) {
        let tree = &self.tree;
        let canvas = &self.canvas;
        self.selection.prune(
            |key| tree.contains(key) || canvas.contains_key(key),
            |arrow_id| canvas.arrow(arrow_id).is_some(),
        );
        self.apply_selection_flags();
    }

    fn apply_selection_flags(&mut self) {
        let order = self.selection.order_map();
        self.tree.apply_selection(&order);
        self.canvas.apply_selection(&order, self.selection.arrows());
    }

    fn refresh_tab_titles(&mut self) {
        let store = self.engine.store();
        for tab in &mut self.tabs {
            if let Some(title) = queries::tab_title(store, tab.kind, tab.root_id) {
                tab.title = title;
            }
        }
    }

    fn refresh_history(&mut self) {
        self.history.set(HistoryView {
            items: self.engine.history_items(),
            current: self.engine.current_history_index(),
        });
    }

    fn refresh_title(&mut self) {
        let mut title = APP_TITLE.to_owned();
        if let Some(document) = &self.document {
            title.push_str(" - ");
            title.push_str(&document.file_name());
        }
        if self.engine.is_dirty() {
            title.push_str(" *");
        }
        self.title.set(title);
    }

    // ---------------------------------------------------------------------------------------
    // Tabs
    // ---------------------------------------------------------------------------------------

    /// Opens (or focuses) the canvas of a System, Flow or Work.
    pub fn open_canvas_tab(&mut self, entity_id: EntityId) -> bool {
        let Some((kind, root_id)) = queries::tab_open_info(self.engine.store(), entity_id) else {
            return false;
        };
        if let Some(index) = self.tabs.iter().position(|tab| tab.key() == (kind, root_id)) {
            return self.activate_tab(index);
        }
        let title = queries::tab_title(self.engine.store(), kind, root_id).unwrap_or_default();
        self.tabs.push(CanvasTab::new(kind, root_id, title));
        self.activate_tab(self.tabs.len() - 1)
    }

    /// Switching canvases drops the selection and any gesture in progress.
    pub fn activate_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.active_tab = Some(index);
        self.interaction.reset();
        self.selection.clear();
        self.refresh_canvas();
        true
    }

    pub fn close_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.tabs.remove(index);
        match self.active_tab {
            Some(active) if active == index => {
                if self.tabs.is_empty() {
                    self.active_tab = None;
                    self.interaction.reset();
                    self.refresh_canvas();
                } else {
                    self.activate_tab(index.min(self.tabs.len() - 1));
                }
            }
            Some(active) if active > index => self.active_tab = Some(active - 1),
            _ => {}
        }
        true
    }

    pub fn close_other_tabs(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        let keep = self.tabs.swap_remove(index);
        let was_active = self.active_tab == Some(index);
        self.tabs = vec![keep];
        if was_active {
            self.active_tab = Some(0);
            self.refresh_canvas();
        } else {
            self.activate_tab(0);
        }
        true
    }

    pub fn close_all_tabs(&mut self) {
        self.tabs.clear();
        self.active_tab = None;
        self.interaction.reset();
        self.selection.clear();
        self.refresh_canvas();
    }

    // ---------------------------------------------------------------------------------------
    // Tree
    // ---------------------------------------------------------------------------------------

    /// A click on a tree row (or on empty tree space for `None`).
    pub fn tree_click(&mut self, key: Option<SelectionKey>, modifiers: Modifiers) {
        if let Some(key) = key {
            if let Some(pane) = self.tree.pane_of(key) {
                self.active_pane = pane;
            }
        }
        let order = self.tree.visible_keys(self.active_pane);
        self.selection.click(key, modifiers, &order);
        self.apply_selection_flags();
    }

    pub fn tree_double_click(&mut self, key: SelectionKey) -> bool {
        key.entity_type.is_canvas_openable() && self.open_canvas_tab(key.id)
    }

    pub fn set_expanded(&mut self, key: SelectionKey, expanded: bool) {
        self.tree.set_expanded(key, expanded);
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        search_tree(&self.tree, query)
    }

    /// Selects a search hit and makes it visible in its tree.
    pub fn reveal(&mut self, key: SelectionKey) -> bool {
        let Some(pane) = self.tree.pane_of(key) else {
            return false;
        };
        self.active_pane = pane;
        self.tree.expand_ancestors(key.id);
        self.selection.set_nodes([key]);
        self.apply_selection_flags();
        true
    }

    // ---------------------------------------------------------------------------------------
    // Canvas
    // ---------------------------------------------------------------------------------------

    /// Runs `f` with the interaction state machine and `self` as its host.
    fn with_interaction<R>(&mut self, f: impl FnOnce(&mut CanvasInteraction, &mut Self) -> R) -> R {
        let mut interaction = std::mem::take(&mut self.interaction);
        let result = f(&mut interaction, self);
        self.interaction = interaction;
        result
    }

    pub fn pointer_down(&mut self, event: PointerEvent) -> bool {
        self.with_interaction(|interaction, host| interaction.pointer_down(host, event))
    }

    pub fn pointer_move(&mut self, screen: DVec2) {
        self.with_interaction(|interaction, host| interaction.pointer_move(host, screen));
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> bool {
        self.with_interaction(|interaction, host| interaction.pointer_up(host, event))
    }

    pub fn key_down(&mut self, key: Key) -> bool {
        self.with_interaction(|interaction, host| interaction.key_down(host, key))
    }

    pub fn wheel(&mut self, screen: DVec2, zoom_in: bool) -> bool {
        self.interaction.wheel(&self.config, screen, zoom_in)
    }

    pub fn start_connect(&mut self, prompt: &mut dyn ArrowTypePrompt) -> ConnectStart {
        self.with_interaction(|interaction, host| interaction.start_connect(host, prompt))
    }

    pub fn fit_to_view(&mut self, view: DVec2) -> bool {
        self.interaction
            .fit_to_view(&self.canvas, view, &self.config)
    }

    pub fn zoom_in(&mut self) {
        self.interaction.viewport_mut().zoom_in(&self.config);
    }

    pub fn zoom_out(&mut self) {
        self.interaction.viewport_mut().zoom_out(&self.config);
    }

    pub fn reset_zoom(&mut self) {
        self.interaction.viewport_mut().reset_zoom(&self.config);
    }

    // ---------------------------------------------------------------------------------------
    // Editing
    // ---------------------------------------------------------------------------------------

    fn primary_key(&self) -> Option<SelectionKey> {
        self.selection.primary()
    }

    fn active_tab_key(&self) -> Option<(crate::projection::TabKind, EntityId)> {
        self.active_tab().map(CanvasTab::key)
    }

    pub fn add_project(&mut self, name: &str) -> bool {
        self.execute(Command::AddProject { name: name.into() })
    }

    pub fn add_system(&mut self, name: &str, is_active: bool) -> bool {
        let target = queries::resolve_add_system_target(
            self.engine.store(),
            self.primary_key(),
            self.active_tab_key(),
        );
        let Some(project_id) = target else {
            self.set_status("[WARN] Select a project first");
            return false;
        };
        self.execute(Command::AddSystem {
            project_id,
            name: name.into(),
            is_active,
        })
    }

    pub fn add_flow(&mut self, name: &str) -> bool {
        let target = queries::resolve_add_flow_target(
            self.engine.store(),
            self.primary_key(),
            self.active_tab_key(),
        );
        let Some(system_id) = target else {
            self.set_status("[WARN] Select a system first");
            return false;
        };
        self.execute(Command::AddFlow {
            system_id,
            name: name.into(),
        })
    }

    pub fn add_work(&mut self, name: &str) -> bool {
        let target = queries::resolve_target_of_type(
            self.engine.store(),
            EntityType::Flow,
            self.primary_key(),
            self.active_tab_key(),
        );
        let Some(flow_id) = target else {
            self.set_status("[WARN] Select a flow first");
            return false;
        };
        self.execute(Command::AddWork {
            flow_id,
            name: name.into(),
            position: None,
        })
    }

    pub fn add_call(&mut self, name: &str, api_def_ids: Vec<EntityId>) -> bool {
        let target = queries::resolve_target_of_type(
            self.engine.store(),
            EntityType::Work,
            self.primary_key(),
            self.active_tab_key(),
        );
        let Some(work_id) = target else {
            self.set_status("[WARN] Select a work first");
            return false;
        };
        self.execute(Command::AddCall {
            work_id,
            name: name.into(),
            position: None,
            api_def_ids,
        })
    }

    pub fn rename_selected(&mut self, new_name: &str) -> bool {
        let Some(key) = self.primary_key().filter(|key| key.entity_type.is_stored()) else {
            return false;
        };
        self.execute(Command::RenameEntity {
            id: key.id,
            new_name: new_name.into(),
        })
    }

    /// Selected arrows if any, otherwise the selected nodes.
    pub fn delete_selected(&mut self) -> bool {
        delete_selection(self)
    }

    /// Copies the selected nodes. They must be copyable and share type and parent.
    pub fn copy_selection(&mut self) -> bool {
        let store = self.engine.store();
        let keys = self.selection.nodes();
        let Some(first) = keys.first().and_then(|key| store.entity(key.id)) else {
            return false;
        };
        let same_group = keys.iter().all(|key| {
            store.entity(key.id).is_some_and(|entity| {
                entity.entity_type() == first.entity_type() && entity.parent_id() == first.parent_id()
            })
        });
        if !first.entity_type().is_copyable() || !same_group {
            self.set_status("[WARN] Copy needs Flows, Works or Calls with the same parent");
            return false;
        }
        self.clipboard = keys.iter().map(|key| key.id).collect();
        let message = format!("Copied {} item(s)", self.clipboard.len());
        self.set_status(message);
        true
    }

    pub fn clipboard(&self) -> &[EntityId] {
        &self.clipboard
    }

    /// Pastes the clipboard under the selected node, or under the active canvas root.
    pub fn paste(&mut self) -> bool {
        if self.clipboard.is_empty() {
            return false;
        }
        let target = self
            .primary_key()
            .filter(|key| key.entity_type.is_stored())
            .map(|key| key.id)
            .or_else(|| self.active_tab().map(|tab| tab.root_id));
        let Some(target_id) = target else {
            self.set_status("[WARN] Select a paste target first");
            return false;
        };
        self.execute(Command::PasteEntities {
            source_ids: self.clipboard.clone(),
            target_id,
        })
    }

    // ---------------------------------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------------------------------

    /// Starts over with an empty document and a fresh engine.
    pub fn new_document(&mut self) {
        self.engine = Engine::new(self.config.clone());
        self.events = self.engine.subscribe();
        self.document = None;
        self.tabs.clear();
        self.active_tab = None;
        self.selection.clear();
        self.clipboard.clear();
        self.interaction = CanvasInteraction::new();
        self.rebuild_all();
        self.refresh_title();
        self.set_status("New document");
    }

    /// Replaces the whole store (load, import). Not undoable.
    pub fn replace_store(&mut self, store: EntityStore) {
        self.interaction.reset();
        self.clipboard.clear();
        self.engine.replace_store(store);
        self.pump_events();
    }

    pub fn load(&mut self, path: impl Into<PathBuf>) -> bool {
        let document = DocumentStore::new(path);
        match document.load() {
            Ok(store) => {
                self.tabs.clear();
                self.active_tab = None;
                self.selection.clear();
                self.document = Some(document);
                self.replace_store(store);
                self.set_status("Loaded");
                true
            }
            Err(err) => {
                error!("load failed: {err}");
                self.set_status(format!("[ERROR] Load failed: {err}"));
                false
            }
        }
    }

    pub fn save(&mut self) -> bool {
        let Some(document) = self.document.clone() else {
            self.set_status("[WARN] No file name; use save as");
            return false;
        };
        self.save_to(document)
    }

    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> bool {
        self.save_to(DocumentStore::new(path))
    }

    fn save_to(&mut self, document: DocumentStore) -> bool {
        match document.save(self.engine.store()) {
            Ok(()) => {
                self.engine.mark_saved();
                self.document = Some(document);
                self.refresh_title();
                self.set_status("Saved");
                true
            }
            Err(err) => {
                error!("save failed: {err}");
                self.set_status(format!("[ERROR] Save failed: {err}"));
                false
            }
        }
    }
}

impl InteractionHost for Session {
    fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn canvas(&self) -> &CanvasProjection {
        &self.canvas
    }

    fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut SelectionEngine {
        &mut self.selection
    }

    fn execute(&mut self, command: Command) -> bool {
        Session::execute(self, command)
    }

    fn resolve_flow_for_connect(&self, source_id: EntityId, target_id: EntityId) -> Option<EntityId> {
        self.engine.resolve_flow_for_connect(source_id, target_id)
    }

    fn open_canvas_tab(&mut self, entity_id: EntityId) {
        Session::open_canvas_tab(self, entity_id);
    }

    fn preview_node(&mut self, entity_id: EntityId, origin: DVec2) {
        self.canvas.set_node_origin(entity_id, origin, &self.config);
    }

    fn selection_changed(&mut self) {
        self.apply_selection_flags();
    }
}

#[cfg(test)]
mod tests;
