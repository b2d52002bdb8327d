// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use crate::model::{ApiCall, ApiCallId, ApiDefProps, ArrowId, ArrowType, EntityId, EntityType, Xywh};

/// A validated, undoable request to mutate the store.
///
/// Batch commands (`MoveEntities`, `RemoveEntities`, `RemoveArrows`, `ConnectInOrder`,
/// `PasteEntities`) are always recorded as a single history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddProject {
        name: SmolStr,
    },
    AddSystem {
        project_id: EntityId,
        name: SmolStr,
        is_active: bool,
    },
    AddFlow {
        system_id: EntityId,
        name: SmolStr,
    },
    AddWork {
        flow_id: EntityId,
        name: SmolStr,
        position: Option<Xywh>,
    },
    AddCall {
        work_id: EntityId,
        name: SmolStr,
        position: Option<Xywh>,
        /// ApiDefs to link; one ApiCall is created per entry.
        api_def_ids: Vec<EntityId>,
    },
    AddApiDef {
        system_id: EntityId,
        name: SmolStr,
    },
    /// Adds a Button, Lamp, Condition or Action under a System.
    AddHwComponent {
        system_id: EntityId,
        kind: EntityType,
        name: SmolStr,
    },
    RenameEntity {
        id: EntityId,
        new_name: SmolStr,
    },
    /// `None` positions reset a node to its default layout slot.
    MoveEntities {
        moves: Vec<(EntityId, Option<Xywh>)>,
    },
    Reparent {
        id: EntityId,
        new_parent_id: EntityId,
    },
    RemoveEntities {
        ids: Vec<EntityId>,
    },
    AddArrow {
        source_id: EntityId,
        target_id: EntityId,
        arrow_type: ArrowType,
    },
    RemoveArrows {
        ids: Vec<ArrowId>,
    },
    ReconnectArrow {
        arrow_id: ArrowId,
        replace_source: bool,
        new_endpoint_id: EntityId,
    },
    /// Chains `ordered[i] → ordered[i + 1]` for every consecutive pair.
    ConnectInOrder {
        ordered: Vec<EntityId>,
        arrow_type: ArrowType,
    },
    UpdateWorkDuration {
        work_id: EntityId,
        text: String,
    },
    UpdateCallTimeout {
        call_id: EntityId,
        text: String,
    },
    UpdateApiDefProperties {
        api_def_id: EntityId,
        props: ApiDefProps,
    },
    AddApiCall {
        call_id: EntityId,
        name: SmolStr,
        api_def_id: Option<EntityId>,
    },
    UpdateApiCall {
        call_id: EntityId,
        api_call: ApiCall,
    },
    RemoveApiCall {
        call_id: EntityId,
        api_call_id: ApiCallId,
    },
    /// Deep-copies same-typed siblings under `target_id` (or under its parent when the target has
    /// the same type as the sources).
    PasteEntities {
        source_ids: Vec<EntityId>,
        target_id: EntityId,
    },
}

impl Command {
    /// The history label shown in undo/redo lists.
    pub fn label(&self) -> SmolStr {
        match self {
            Self::AddProject { .. } => "Add Project".into(),
            Self::AddSystem { .. } => "Add System".into(),
            Self::AddFlow { .. } => "Add Flow".into(),
            Self::AddWork { .. } => "Add Work".into(),
            Self::AddCall { .. } => "Add Call".into(),
            Self::AddApiDef { .. } => "Add ApiDef".into(),
            Self::AddHwComponent { kind, .. } => smol_str::format_smolstr!("Add {kind}"),
            Self::RenameEntity { new_name, .. } => {
                smol_str::format_smolstr!("Rename to '{}'", new_name.trim())
            }
            Self::MoveEntities { moves } => smol_str::format_smolstr!("Move {} node(s)", moves.len()),
            Self::Reparent { .. } => "Reparent".into(),
            Self::RemoveEntities { ids } => smol_str::format_smolstr!("Delete {} item(s)", ids.len()),
            Self::AddArrow { arrow_type, .. } => smol_str::format_smolstr!("Add {arrow_type} Arrow"),
            Self::RemoveArrows { ids } => smol_str::format_smolstr!("Delete {} arrow(s)", ids.len()),
            Self::ReconnectArrow { .. } => "Reconnect Arrow".into(),
            Self::ConnectInOrder { ordered, .. } => {
                smol_str::format_smolstr!("Connect {} node(s)", ordered.len())
            }
            Self::UpdateWorkDuration { .. } => "Update Duration".into(),
            Self::UpdateCallTimeout { .. } => "Update Timeout".into(),
            Self::UpdateApiDefProperties { .. } => "Update ApiDef".into(),
            Self::AddApiCall { .. } => "Add ApiCall".into(),
            Self::UpdateApiCall { .. } => "Update ApiCall".into(),
            Self::RemoveApiCall { .. } => "Remove ApiCall".into(),
            Self::PasteEntities { source_ids, .. } => {
                smol_str::format_smolstr!("Paste {} item(s)", source_ids.len())
            }
        }
    }
}
