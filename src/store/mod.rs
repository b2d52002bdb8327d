// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for documents on disk.
//!
//! A document is one JSON file holding the entity store. Loading replays the file through the
//! same validated ops the engine uses; saving writes a temp file and renames it into place.

mod demo;
mod document;

pub use demo::demo_store;
pub use document::{DocumentFile, DocumentStore, StoreError, WriteDurability, DOCUMENT_VERSION};
