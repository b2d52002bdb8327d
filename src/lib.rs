// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Procflow: the editing core of a hierarchical process-model editor.
//!
//! Every mutation goes through [`engine::Engine`] as a [`engine::Command`]; projections,
//! selection and the canvas state machine only read the store and react to the events the
//! engine emits. [`session::Session`] wires them together for a host UI.

pub mod config;
pub mod engine;
pub mod geometry;
pub mod interaction;
pub mod model;
pub mod observable;
pub mod ops;
pub mod projection;
pub mod selection;
pub mod session;
pub mod store;
