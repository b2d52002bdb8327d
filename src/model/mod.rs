// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A project is a tree of typed entities (Project, System, Flow, Work, Call, ApiDef and hardware
//! components) plus typed arrows between Works or Calls of one flow.

pub mod arrow;
pub mod entity;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod store;

pub use arrow::{Arrow, ArrowType, EndpointKind};
pub use entity::{
    ApiCall, ApiDefProps, CallProps, Entity, EntityProps, EntityType, SelectionKey, WorkProps,
    Xywh,
};
pub use ids::{ApiCallId, ArrowId, EntityId, Id, IdError};
pub use store::EntityStore;
